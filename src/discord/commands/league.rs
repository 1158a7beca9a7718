// League settings the draft reads: registered teams, roster cap, alerts channel.

use crate::core::league::{LeagueConfig, LeagueError};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Manage league settings
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("addteam", "removeteam", "rostercap", "alerts", "show")
)]
pub async fn league(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Register a team. The name must match the team's role.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn addteam(
    ctx: Context<'_>,
    #[description = "Team name (same as its role)"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    match ctx.data().league.add_team(guild_id.get(), &name).await {
        Ok(_) => {
            let name = name.trim();
            let has_role = ctx
                .guild()
                .map(|guild| guild.role_by_name(name).is_some())
                .unwrap_or(false);
            let message = if has_role {
                format!("✅ Registered **{}**.", name)
            } else {
                format!(
                    "✅ Registered **{}**. ⚠️ No role with that name exists yet; create it before the draft starts.",
                    name
                )
            };
            ctx.say(message).await?;
            Ok(())
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Unregister a team.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn removeteam(
    ctx: Context<'_>,
    #[description = "Team to remove"]
    #[autocomplete = "crate::discord::commands::draft::autocomplete_team"]
    name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    match ctx.data().league.remove_team(guild_id.get(), &name).await {
        Ok(_) => {
            ctx.say(format!("✅ Removed **{}**.", name)).await?;
            Ok(())
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Set the maximum number of players per team.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn rostercap(
    ctx: Context<'_>,
    #[description = "Maximum players per team"]
    #[min = 1]
    cap: u32,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    match ctx.data().league.set_roster_cap(guild_id.get(), cap).await {
        Ok(config) => {
            ctx.say(format!("✅ Roster cap set to **{}** players.", config.roster_cap))
                .await?;
            Ok(())
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Set the channel for draft announcements. Leave empty to use the command channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn alerts(
    ctx: Context<'_>,
    #[description = "Announcement channel"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let channel_id = channel.as_ref().map(|c| c.id.get());

    ctx.data()
        .league
        .set_alerts_channel(guild_id.get(), channel_id)
        .await?;

    let message = match channel_id {
        Some(id) => format!("✅ Draft announcements will be posted in <#{}>.", id),
        None => "✅ Draft announcements will be posted where commands are used.".to_string(),
    };
    ctx.say(message).await?;
    Ok(())
}

/// Show the league settings.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let config = ctx.data().league.get_config(guild_id.get()).await?;

    ctx.send(poise::CreateReply::default().embed(settings_embed(&config)))
        .await?;
    Ok(())
}

fn settings_embed(config: &LeagueConfig) -> serenity::CreateEmbed {
    let teams = if config.teams.is_empty() {
        "None registered".to_string()
    } else {
        config.teams.join("\n")
    };
    let alerts = config
        .alerts_channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Command channel".to_string());

    serenity::CreateEmbed::default()
        .title("League Settings")
        .color(0x3498db)
        .field(format!("Teams ({})", config.teams.len()), teams, false)
        .field("Roster Cap", format!("{} players", config.roster_cap), true)
        .field("Alerts Channel", alerts, true)
}

async fn reject(ctx: Context<'_>, err: LeagueError) -> Result<(), Error> {
    if err.is_rejection() {
        ctx.send(
            poise::CreateReply::default()
                .content(format!("❌ {}", err))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    } else {
        Err(err.into())
    }
}
