// Draft domain models and the turn-order state machine.
//
// Everything in here is synchronous and side-effect free: the service layer
// loads a `DraftState`, runs one of these transitions on it and writes it back.

use super::draft_error::DraftError;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on `rounds * picks_per_round`. The order is built eagerly, so
/// this keeps a single `start` from allocating without limit.
pub const MAX_DRAFT_SLOTS: usize = 2_000;

/// Teams are identified by name (the name of their Discord role).
pub type TeamId = String;

/// The player being drafted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: u64,
    pub display_name: String,
}

/// One accepted pick. The `picks` list is an append-only audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRecord {
    pub round: u32,
    pub pick: u32,
    pub team: TeamId,
    pub player_id: u64,
    pub player_name: String,
    pub picked_at: DateTime<Utc>,
}

/// Coarse lifecycle of a draft, derived from the `active`/`paused` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    Inactive,
    Running,
    Paused,
}

impl std::fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftPhase::Inactive => write!(f, "Inactive"),
            DraftPhase::Running => write!(f, "Active"),
            DraftPhase::Paused => write!(f, "Paused"),
        }
    }
}

/// Full draft state for one league (guild).
///
/// Every field is required when deserializing: a state file missing a field
/// is rejected instead of being patched with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    pub active: bool,
    pub paused: bool,
    pub total_rounds: u32,
    pub picks_per_round: u32,
    /// Length is `total_rounds * picks_per_round` while a draft is running.
    pub order: Vec<TeamId>,
    /// 1-indexed; 0 only when no draft has been started since the last reset.
    pub current_round: u32,
    /// 1-indexed; 0 only when no draft has been started since the last reset.
    pub current_pick: u32,
    /// Stored and displayed only. Nothing consults it when picking.
    pub autopick: BTreeMap<TeamId, bool>,
    pub picks: Vec<PickRecord>,
}

impl Default for DraftState {
    fn default() -> Self {
        Self {
            active: false,
            paused: false,
            total_rounds: 0,
            picks_per_round: 0,
            order: Vec::new(),
            current_round: 0,
            current_pick: 0,
            autopick: BTreeMap::new(),
            picks: Vec::new(),
        }
    }
}

impl DraftState {
    pub fn phase(&self) -> DraftPhase {
        match (self.active, self.paused) {
            (false, _) => DraftPhase::Inactive,
            (true, false) => DraftPhase::Running,
            (true, true) => DraftPhase::Paused,
        }
    }

    /// Position of the current pick inside `order`.
    ///
    /// `None` when the counters have been reset. Equal to `order.len()` once
    /// the draft has run through every round.
    pub fn current_index(&self) -> Option<usize> {
        if self.current_round == 0 || self.current_pick == 0 {
            return None;
        }
        let round = (self.current_round - 1) as usize;
        let pick = (self.current_pick - 1) as usize;
        Some(round * self.picks_per_round as usize + pick)
    }

    /// The team whose turn it is, if a draft is active and not exhausted.
    pub fn team_on_clock(&self) -> Option<&str> {
        if !self.active {
            return None;
        }
        self.current_index()
            .and_then(|index| self.order.get(index))
            .map(String::as_str)
    }

    /// Start a new draft.
    ///
    /// The order is `teams` repeated `rounds` times, shuffled once, then cut
    /// down to `rounds * picks_per_round` entries.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        rounds: u32,
        picks_per_round: u32,
        teams: &[TeamId],
        rng: &mut R,
    ) -> Result<(), DraftError> {
        if self.active {
            return Err(DraftError::AlreadyActive);
        }
        if rounds < 1 || picks_per_round < 1 {
            return Err(DraftError::InvalidRounds);
        }
        let slots = (rounds as usize)
            .checked_mul(picks_per_round as usize)
            .filter(|slots| *slots <= MAX_DRAFT_SLOTS)
            .ok_or(DraftError::DraftTooLarge {
                max: MAX_DRAFT_SLOTS,
            })?;
        if picks_per_round as usize > teams.len() {
            return Err(DraftError::PicksExceedTeamCount {
                picks_per_round,
                teams: teams.len(),
            });
        }

        let mut order: Vec<TeamId> = std::iter::repeat(teams)
            .take(rounds as usize)
            .flatten()
            .cloned()
            .collect();
        order.shuffle(rng);
        order.truncate(slots);

        *self = DraftState {
            active: true,
            paused: false,
            total_rounds: rounds,
            picks_per_round,
            order,
            current_round: 1,
            current_pick: 1,
            autopick: teams.iter().map(|team| (team.clone(), false)).collect(),
            picks: Vec::new(),
        };
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), DraftError> {
        if !self.active {
            return Err(DraftError::NotActive);
        }
        if self.paused {
            return Err(DraftError::AlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), DraftError> {
        if !self.active {
            return Err(DraftError::NotActive);
        }
        if !self.paused {
            return Err(DraftError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Reset everything except the pick history.
    pub fn end(&mut self) {
        let picks = std::mem::take(&mut self.picks);
        *self = DraftState {
            picks,
            ..DraftState::default()
        };
    }

    /// Fails unless a draft is running and not paused.
    pub fn ensure_running(&self) -> Result<(), DraftError> {
        if !self.active {
            return Err(DraftError::NotActive);
        }
        if self.paused {
            return Err(DraftError::DraftPaused);
        }
        Ok(())
    }

    /// The state-only part of pick validation, in the order the checks must
    /// run. Roster checks happen afterwards in the service.
    pub fn check_turn(&self, team: &str) -> Result<(), DraftError> {
        self.ensure_running()?;
        let on_clock = self
            .current_index()
            .and_then(|index| self.order.get(index))
            .ok_or(DraftError::DraftConcluded)?;
        if on_clock != team {
            return Err(DraftError::NotYourTurn {
                team: team.to_string(),
                on_clock: on_clock.clone(),
            });
        }
        Ok(())
    }

    /// Append a pick and advance the pointer. Callers must have passed
    /// `check_turn` for `team` first.
    ///
    /// When the last round is exhausted the draft deactivates itself but keeps
    /// `order` and the counters at their terminal values; only `end` clears them.
    pub fn record_pick(
        &mut self,
        team: &str,
        player: &PlayerRef,
        picked_at: DateTime<Utc>,
    ) -> PickRecord {
        let record = PickRecord {
            round: self.current_round,
            pick: self.current_pick,
            team: team.to_string(),
            player_id: player.id,
            player_name: player.display_name.clone(),
            picked_at,
        };
        self.picks.push(record.clone());

        self.current_pick += 1;
        if self.current_pick > self.picks_per_round {
            self.current_pick = 1;
            self.current_round += 1;
        }
        if self.current_round > self.total_rounds {
            self.active = false;
            self.paused = false;
        }

        record
    }

    /// Flip a team's autopick flag and return the new value.
    pub fn toggle_autopick(&mut self, team: &str) -> Result<bool, DraftError> {
        if !self.active {
            return Err(DraftError::NotActive);
        }
        let flag = self
            .autopick
            .get_mut(team)
            .ok_or_else(|| DraftError::UnknownTeam(team.to_string()))?;
        *flag = !*flag;
        Ok(*flag)
    }

    /// The order grouped into rounds, for display.
    pub fn describe_order(&self) -> Vec<(u32, Vec<TeamId>)> {
        if self.picks_per_round == 0 {
            return Vec::new();
        }
        self.order
            .chunks(self.picks_per_round as usize)
            .enumerate()
            .map(|(i, chunk)| (i as u32 + 1, chunk.to_vec()))
            .collect()
    }

    /// Check the structural invariants of a state read back from storage.
    pub fn validate(&self) -> Result<(), String> {
        if !self.active && self.paused {
            return Err("paused without an active draft".to_string());
        }

        let Some(index) = self.current_index() else {
            if self.active {
                return Err("active draft without a current pick".to_string());
            }
            if !self.order.is_empty() {
                return Err("draft order present after reset".to_string());
            }
            return Ok(());
        };

        if self.total_rounds < 1 || self.picks_per_round < 1 {
            return Err("rounds and picks per round must be positive".to_string());
        }
        if self.current_pick > self.picks_per_round {
            return Err(format!(
                "current pick {} exceeds picks per round {}",
                self.current_pick, self.picks_per_round
            ));
        }
        let expected = self.total_rounds as usize * self.picks_per_round as usize;
        if self.order.len() != expected {
            return Err(format!(
                "draft order has {} entries, expected {}",
                self.order.len(),
                expected
            ));
        }
        if index > self.order.len() {
            return Err(format!(
                "current index {} is past the end of the order",
                index
            ));
        }
        if self.active && index == self.order.len() {
            return Err("active draft with an exhausted order".to_string());
        }
        Ok(())
    }
}
