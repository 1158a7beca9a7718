// Discord commands for running a draft.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call the draft service
// 3. Announce / reply based on the result
//
// `pick` and `forcepick` share one code path; they only differ in who may use them.

use crate::core::draft::{team_roster, DraftError, DraftService, PlayerRef, RosterError, TeamId};
use crate::core::league::{LeagueConfig, LeagueService};
use crate::discord::draft::announcements::{self, announce};
use crate::discord::draft::guild_roster::{member_team, team_role_ids, GuildRoster};
use crate::infra::draft::JsonDraftStore;
use crate::infra::league::JsonLeagueStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Roles allowed to pick and toggle autopick for their own team.
const FRONT_OFFICE_ROLES: [&str; 2] = ["Franchise Owner", "General Manager"];

/// Run the league draft.
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "start",
        "end",
        "pause",
        "resume",
        "pick",
        "forcepick",
        "autopick",
        "order",
        "status",
        "roster"
    )
)]
pub async fn draft(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Start a new draft.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn start(
    ctx: Context<'_>,
    #[description = "Number of draft rounds"]
    #[min = 1]
    rounds: u32,
    #[description = "Picks per round"]
    #[min = 1]
    picks_per_round: u32,
) -> Result<(), Error> {
    let league = league_config(ctx).await?;

    match ctx
        .data()
        .draft
        .start_draft(league.guild_id, rounds, picks_per_round, &league.teams)
        .await
    {
        Ok(state) => {
            announce(ctx, league.alerts_channel_id, announcements::draft_started(&state)).await?;
            reply_ephemeral(ctx, "Draft started!").await
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// End the current draft. Pick history is kept.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn end(ctx: Context<'_>) -> Result<(), Error> {
    let league = league_config(ctx).await?;

    ctx.data().draft.end_draft(league.guild_id).await?;
    announce(ctx, league.alerts_channel_id, announcements::draft_ended()).await?;
    reply_ephemeral(ctx, "Draft ended!").await
}

/// Pause the draft.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    let league = league_config(ctx).await?;

    match ctx.data().draft.pause(league.guild_id).await {
        Ok(_) => {
            announce(ctx, league.alerts_channel_id, announcements::draft_paused()).await?;
            reply_ephemeral(ctx, "Draft paused.").await
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Resume a paused draft.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn resume(ctx: Context<'_>) -> Result<(), Error> {
    let league = league_config(ctx).await?;

    match ctx.data().draft.resume(league.guild_id).await {
        Ok(state) => {
            announce(ctx, league.alerts_channel_id, announcements::draft_resumed(&state)).await?;
            reply_ephemeral(ctx, "Draft resumed!").await
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Make a draft pick for your team.
#[poise::command(slash_command, guild_only)]
pub async fn pick(
    ctx: Context<'_>,
    #[description = "The team making the pick"]
    #[autocomplete = "autocomplete_team"]
    team: String,
    #[description = "The player to draft"] player: serenity::Member,
) -> Result<(), Error> {
    let league = league_config(ctx).await?;
    if !draft_is_running(ctx, league.guild_id).await? {
        return Ok(());
    }
    if !league.has_team(&team) {
        return reply_ephemeral(ctx, "Invalid team. Register it with `/league addteam` first.")
            .await;
    }

    let caller = describe_caller(ctx, &league.teams).await?;
    if !caller.front_office {
        return reply_ephemeral(
            ctx,
            "Only Franchise Owners and General Managers can make picks.",
        )
        .await;
    }
    if caller.team.as_deref() != Some(team.as_str()) {
        return reply_ephemeral(ctx, "You can only make picks for your own team.").await;
    }

    submit_pick(ctx, &league, &team, &player).await
}

/// Make a draft pick on behalf of any team.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn forcepick(
    ctx: Context<'_>,
    #[description = "The team making the pick"]
    #[autocomplete = "autocomplete_team"]
    team: String,
    #[description = "The player being drafted"] player: serenity::Member,
) -> Result<(), Error> {
    let league = league_config(ctx).await?;
    if !draft_is_running(ctx, league.guild_id).await? {
        return Ok(());
    }
    if !league.has_team(&team) {
        return reply_ephemeral(ctx, "Invalid team. Register it with `/league addteam` first.")
            .await;
    }

    submit_pick(ctx, &league, &team, &player).await
}

/// Toggle autopick for your team.
#[poise::command(slash_command, guild_only)]
pub async fn autopick(
    ctx: Context<'_>,
    #[description = "The team to toggle autopick for"]
    #[autocomplete = "autocomplete_team"]
    team: String,
) -> Result<(), Error> {
    let league = league_config(ctx).await?;
    if !league.has_team(&team) {
        return reply_ephemeral(ctx, "Invalid team. Register it with `/league addteam` first.")
            .await;
    }

    let caller = describe_caller(ctx, &league.teams).await?;
    if !caller.front_office || caller.team.as_deref() != Some(team.as_str()) {
        return reply_ephemeral(ctx, "You can only toggle autopick for your own team.").await;
    }

    match ctx.data().draft.toggle_autopick(league.guild_id, &team).await {
        Ok(enabled) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(announcements::autopick_updated(&team, enabled))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(err) => reject(ctx, err).await,
    }
}

/// Show the draft order by round.
#[poise::command(slash_command, guild_only)]
pub async fn order(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    if ctx.data().draft.team_on_clock(guild_id).await?.is_none() {
        return reject(ctx, DraftError::NotActive).await;
    }
    let rounds = ctx.data().draft.describe_order(guild_id).await?;

    ctx.send(
        poise::CreateReply::default()
            .embed(announcements::draft_order(&rounds))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Show the current draft status and picks made so far.
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let state = ctx.data().draft.state(guild_id).await?;
    if !state.active {
        return reject(ctx, DraftError::NotActive).await;
    }

    ctx.send(poise::CreateReply::default().embed(announcements::draft_status(&state)))
        .await?;
    Ok(())
}

/// Show a team's roster and how close it is to the roster cap.
#[poise::command(slash_command, guild_only)]
pub async fn roster(
    ctx: Context<'_>,
    #[description = "The team to show"]
    #[autocomplete = "autocomplete_team"]
    team: String,
) -> Result<(), Error> {
    let league = league_config(ctx).await?;
    if !league.has_team(&team) {
        return reply_ephemeral(ctx, "Invalid team. Register it with `/league addteam` first.")
            .await;
    }

    // Listing members pages through the Discord API.
    ctx.defer().await?;

    let directory = GuildRoster::new(
        ctx.serenity_context(),
        serenity::GuildId::new(league.guild_id),
        &league.teams,
    )?;
    match team_roster(&directory, &team, league.roster_cap as usize).await {
        Ok(view) => {
            ctx.send(poise::CreateReply::default().embed(announcements::team_roster(&view)))
                .await?;
            Ok(())
        }
        Err(RosterError::UnknownTeam(_)) => {
            reply_ephemeral(ctx, format!("No role named **{}** exists.", team)).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Replies with the reason and returns false when no draft is running.
async fn draft_is_running(ctx: Context<'_>, guild_id: u64) -> Result<bool, Error> {
    let state = ctx.data().draft.state(guild_id).await?;
    match state.ensure_running() {
        Ok(()) => Ok(true),
        Err(err) => {
            reject(ctx, err).await?;
            Ok(false)
        }
    }
}

/// Shared tail of `pick` and `forcepick`.
async fn submit_pick(
    ctx: Context<'_>,
    league: &LeagueConfig,
    team: &str,
    player: &serenity::Member,
) -> Result<(), Error> {
    // Roster lookups hit the Discord API; don't let the interaction time out.
    ctx.defer_ephemeral().await?;

    let roster = GuildRoster::new(
        ctx.serenity_context(),
        serenity::GuildId::new(league.guild_id),
        &league.teams,
    )?;
    let player = PlayerRef {
        id: player.user.id.get(),
        display_name: player.display_name().to_string(),
    };

    match ctx
        .data()
        .draft
        .make_pick(
            league.guild_id,
            team,
            &player,
            league.roster_cap as usize,
            &roster,
        )
        .await
    {
        Ok(outcome) => {
            announce(ctx, league.alerts_channel_id, announcements::pick_made(&outcome)).await?;
            reply_ephemeral(ctx, "Pick set!").await
        }
        Err(err) => reject(ctx, err).await,
    }
}

async fn league_config(ctx: Context<'_>) -> Result<LeagueConfig, Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    Ok(ctx.data().league.get_config(guild_id).await?)
}

/// What the invoking member is allowed to do.
struct Caller {
    front_office: bool,
    team: Option<TeamId>,
}

async fn describe_caller(ctx: Context<'_>, teams: &[TeamId]) -> Result<Caller, Error> {
    let member_roles = ctx
        .author_member()
        .await
        .ok_or("Could not load your server membership")?
        .roles
        .clone();

    let guild = ctx.guild().ok_or("Guild not found")?;
    let front_office = member_roles
        .iter()
        .filter_map(|role_id| guild.roles.get(role_id))
        .any(|role| FRONT_OFFICE_ROLES.contains(&role.name.as_str()));
    let team = member_team(&team_role_ids(&guild, teams), &member_roles);

    Ok(Caller { front_office, team })
}

/// Validation failures go back to the user; anything else is a real error.
async fn reject(ctx: Context<'_>, err: DraftError) -> Result<(), Error> {
    if err.is_rejection() {
        reply_ephemeral(ctx, err.to_string()).await
    } else {
        tracing::error!("Draft command failed: {}", err);
        Err(err.into())
    }
}

async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Autocomplete registered team names.
pub async fn autocomplete_team(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Some(guild_id) = ctx.guild_id() else {
        return Vec::new();
    };
    let Ok(teams) = ctx.data().league.list_teams(guild_id.get()).await else {
        return Vec::new();
    };

    let partial = partial.to_lowercase();
    teams
        .into_iter()
        .filter(|team| team.to_lowercase().contains(&partial))
        .take(25) // Discord autocomplete limit
        .collect()
}

// ============================================================================
// SHARED COMMAND TYPES
// ============================================================================

pub struct Data {
    pub draft: Arc<DraftService<JsonDraftStore>>,
    pub league: Arc<LeagueService<JsonLeagueStore>>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
