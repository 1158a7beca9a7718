// Embeds for draft events and where to post them.

use crate::core::draft::{DraftState, PickOutcome, TeamId, TeamRoster};
use crate::discord::{Context, Error};
use poise::serenity_prelude::{self as serenity, builder::CreateMessage};

const COLOR_STARTED: u32 = 0x2ecc71;
const COLOR_ENDED: u32 = 0xe74c3c;
const COLOR_PAUSED: u32 = 0xe67e22;
const COLOR_INFO: u32 = 0x3498db;

// Discord rejects embed field values longer than this.
const FIELD_VALUE_LIMIT: usize = 1024;

/// Post an announcement to the league's alerts channel, or to the channel the
/// command was used in when none is configured.
pub async fn announce(
    ctx: Context<'_>,
    alerts_channel_id: Option<u64>,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    let channel = alerts_channel_id
        .map(serenity::ChannelId::new)
        .unwrap_or_else(|| ctx.channel_id());
    channel
        .send_message(&ctx.serenity_context().http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

fn clock_line(state: &DraftState) -> Option<String> {
    state.team_on_clock().map(|team| {
        format!(
            "{} is on the clock for Round {}, Pick {}.",
            team, state.current_round, state.current_pick
        )
    })
}

fn base_embed(title: &str, color: u32) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .color(color)
        .timestamp(serenity::Timestamp::now())
}

pub fn draft_started(state: &DraftState) -> serenity::CreateEmbed {
    let description = match clock_line(state) {
        Some(line) => format!("The draft has begun! {}", line),
        None => "The draft has begun!".to_string(),
    };
    base_embed("Draft Started", COLOR_STARTED)
        .description(description)
        .field("Total Rounds", state.total_rounds.to_string(), true)
        .field("Picks per Round", state.picks_per_round.to_string(), true)
}

pub fn draft_ended() -> serenity::CreateEmbed {
    base_embed("Draft Ended", COLOR_ENDED).description("The draft has been terminated.")
}

pub fn draft_paused() -> serenity::CreateEmbed {
    base_embed("Draft Paused", COLOR_PAUSED).description("The draft has been paused.")
}

pub fn draft_resumed(state: &DraftState) -> serenity::CreateEmbed {
    let description = match clock_line(state) {
        Some(line) => format!("The draft has resumed. {}", line),
        None => "The draft has resumed.".to_string(),
    };
    base_embed("Draft Resumed", COLOR_STARTED).description(description)
}

pub fn pick_made(outcome: &PickOutcome) -> serenity::CreateEmbed {
    let pick = &outcome.pick;
    let embed = base_embed("Draft Pick", COLOR_INFO).description(format!(
        "{} selects <@{}> in Round {}, Pick {}.",
        pick.team, pick.player_id, pick.round, pick.pick
    ));

    if outcome.concluded_draft() {
        embed.field("Draft Complete", "The draft has concluded!", false)
    } else if let Some(line) = clock_line(&outcome.state) {
        embed.field("Next Pick", line, false)
    } else {
        embed
    }
}

pub fn autopick_updated(team: &str, enabled: bool) -> serenity::CreateEmbed {
    let status = if enabled { "enabled" } else { "disabled" };
    base_embed("Auto-pick Updated", COLOR_INFO)
        .description(format!("Autopick {} for {}.", status, team))
}

pub fn draft_order(rounds: &[(u32, Vec<TeamId>)]) -> serenity::CreateEmbed {
    base_embed("Draft Order", COLOR_INFO).description(format_order(rounds))
}

pub fn draft_status(state: &DraftState) -> serenity::CreateEmbed {
    let mut embed = base_embed("Draft Status", COLOR_INFO)
        .field("Status", state.phase().to_string(), true)
        .field(
            "Current Pick",
            format!("Round {}, Pick {}", state.current_round, state.current_pick),
            true,
        );

    if let Some(team) = state.team_on_clock() {
        embed = embed.field("On the Clock", team, false);
    }

    embed.field("Picks Made", format_picks(state), false)
}

pub fn team_roster(roster: &TeamRoster) -> serenity::CreateEmbed {
    let color = if roster.is_full() {
        COLOR_PAUSED
    } else {
        COLOR_INFO
    };
    base_embed(&format!("{} Roster", roster.team), color)
        .field("Players", format_roster(roster), false)
        .field(
            "Roster Cap",
            format!("{}/{}", roster.players.len(), roster.cap),
            false,
        )
}

fn format_roster(roster: &TeamRoster) -> String {
    if roster.players.is_empty() {
        return "None".to_string();
    }
    let names: Vec<&str> = roster
        .players
        .iter()
        .map(|player| player.display_name.as_str())
        .collect();
    truncate_chars(&names.join(", "), FIELD_VALUE_LIMIT)
}

fn format_order(rounds: &[(u32, Vec<TeamId>)]) -> String {
    rounds
        .iter()
        .map(|(round, teams)| {
            let picks: Vec<String> = teams
                .iter()
                .enumerate()
                .map(|(i, team)| format!("{} (Pick {})", team, i + 1))
                .collect();
            format!("**Round {}**\n{}", round, picks.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_picks(state: &DraftState) -> String {
    if state.picks.is_empty() {
        return "None".to_string();
    }
    let lines: Vec<String> = state
        .picks
        .iter()
        .map(|pick| {
            format!(
                "{}: {} (Round {}, Pick {})",
                pick.team, pick.player_name, pick.round, pick.pick
            )
        })
        .collect();
    truncate_chars(&lines.join("\n"), FIELD_VALUE_LIMIT)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
