use crate::core::draft::TeamId;
use serde::{Deserialize, Serialize};

/// Roster cap used until a league sets its own.
pub const DEFAULT_ROSTER_CAP: u32 = 53;

/// Per-guild league settings the draft depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub guild_id: u64,
    /// Registered teams, in registration order. Each name matches a guild role.
    pub teams: Vec<TeamId>,
    /// Maximum number of players a team may hold.
    pub roster_cap: u32,
    /// Where draft announcements go. Falls back to the invoking channel.
    pub alerts_channel_id: Option<u64>,
}

impl LeagueConfig {
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            teams: Vec::new(),
            roster_cap: DEFAULT_ROSTER_CAP,
            alerts_channel_id: None,
        }
    }

    pub fn has_team(&self, name: &str) -> bool {
        self.teams.iter().any(|team| team == name)
    }
}
