// This is the entry point of the league draft bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic): the draft state machine and league settings
// - `infra/` = Implementations of core traits (JSON files, in-memory)
// - `discord/` = Discord-specific adapters (commands, role-backed rosters, announcements)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::draft::DraftService;
use crate::core::league::LeagueService;
use crate::discord::commands::presence;
use crate::discord::{Data, Error};
use crate::infra::draft::JsonDraftStore;
use crate::infra::league::JsonLeagueStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::path::PathBuf;
use std::sync::Arc;

/// Process-wide settings read from the environment (and `.env`, if present).
struct Settings {
    token: String,
    data_dir: PathBuf,
    /// Register commands in this guild only, which applies instantly. Handy in development.
    dev_guild_id: Option<serenity::GuildId>,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let dev_guild_id = match std::env::var("DEV_GUILD_ID") {
            Ok(raw) => Some(serenity::GuildId::new(
                raw.parse::<u64>()
                    .with_context(|| format!("DEV_GUILD_ID is not a valid id: {}", raw))?,
            )),
            Err(_) => None,
        };

        Ok(Self {
            token,
            data_dir,
            dev_guild_id,
        })
    }
}

/// Log every command error; the user sees poise's default reply.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    if let poise::FrameworkError::Command { error, ctx, .. } = &error {
        tracing::error!(
            command = %ctx.command().qualified_name,
            guild_id = ctx.guild_id().map(|id| id.get()),
            "Command failed: {}",
            error
        );
    }
    if let Err(e) = poise::builtins::on_error(error).await {
        tracing::error!("Error while handling error: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening. RUST_LOG overrides the default.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    // Keep runtime state in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            settings.data_dir.display()
        )
    })?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let draft_store = JsonDraftStore::open(settings.data_dir.join("draft.json"))
        .context("Failed to open draft state file")?;
    let draft_service = Arc::new(DraftService::new(draft_store));

    let league_store = JsonLeagueStore::open(settings.data_dir.join("league.json"))
        .context("Failed to open league settings file")?;
    let league_service = Arc::new(LeagueService::new(league_store));

    // Create the data structure that will be shared across all commands
    let data = Data {
        draft: Arc::clone(&draft_service),
        league: Arc::clone(&league_service),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // Role membership (rosters) is read from the member cache.
    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MEMBERS;

    let dev_guild_id = settings.dev_guild_id;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::draft::draft(),
                discord::commands::league::league(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "Bot is starting up");

                match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await?;
                        tracing::info!(guild_id = guild_id.get(), "Commands registered in guild");
                    }
                    None => {
                        // Global registration can take up to an hour to propagate.
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        tracing::info!("Commands registered globally");
                    }
                }

                presence::on_ready(ctx);
                tracing::info!("Bot is ready");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(settings.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
