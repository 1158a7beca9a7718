// Roster collaborator port.
//
// Who is on which team lives outside the draft (on Discord it is role
// membership), so the draft asks through this trait instead of owning it.

use super::draft_models::{PlayerRef, TeamId};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("No roster exists for team {0}")]
    UnknownTeam(String),
    #[error("Roster lookup failed: {0}")]
    Lookup(String),
    #[error("Could not assign player: {0}")]
    Assign(String),
}

#[async_trait]
pub trait RosterDirectory: Send + Sync {
    /// The team a player currently belongs to, if any.
    async fn team_of(&self, player_id: u64) -> Result<Option<TeamId>, RosterError>;

    /// Everyone currently on a team.
    async fn members(&self, team: &str) -> Result<Vec<PlayerRef>, RosterError>;

    /// Number of players currently on a team.
    async fn roster_size(&self, team: &str) -> Result<usize, RosterError> {
        Ok(self.members(team).await?.len())
    }

    /// Put a player on a team.
    async fn assign(&self, player_id: u64, team: &str) -> Result<(), RosterError>;
}

/// A team's players measured against the league's roster cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub team: TeamId,
    /// Sorted by display name.
    pub players: Vec<PlayerRef>,
    pub cap: usize,
}

impl TeamRoster {
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.cap
    }

    pub fn open_slots(&self) -> usize {
        self.cap.saturating_sub(self.players.len())
    }
}

pub async fn team_roster<R: RosterDirectory + ?Sized>(
    roster: &R,
    team: &str,
    cap: usize,
) -> Result<TeamRoster, RosterError> {
    let mut players = roster.members(team).await?;
    players.sort_by_cached_key(|player| (player.display_name.to_lowercase(), player.id));

    Ok(TeamRoster {
        team: team.to_string(),
        players,
        cap,
    })
}
