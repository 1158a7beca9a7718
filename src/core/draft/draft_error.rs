use super::roster::RosterError;
use crate::core::store::StoreError;
use thiserror::Error;

/// Everything that can go wrong while running a draft.
///
/// The display strings are shown to users as-is.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("A draft is already active.")]
    AlreadyActive,

    #[error("Rounds and picks per round must be positive.")]
    InvalidRounds,

    #[error("A draft can have at most {max} picks in total.")]
    DraftTooLarge { max: usize },

    #[error("Picks per round ({picks_per_round}) cannot exceed the number of teams ({teams}).")]
    PicksExceedTeamCount { picks_per_round: u32, teams: usize },

    #[error("No draft is currently active.")]
    NotActive,

    #[error("The draft is paused.")]
    DraftPaused,

    #[error("The draft is already paused.")]
    AlreadyPaused,

    #[error("The draft is not paused.")]
    NotPaused,

    #[error("The draft has ended.")]
    DraftConcluded,

    #[error("It's not {team}'s turn to pick. {on_clock} is on the clock.")]
    NotYourTurn { team: String, on_clock: String },

    #[error("{player} is already on {team}.")]
    PlayerAlreadyRostered { player: String, team: String },

    #[error("{team} has reached the roster cap ({cap}).")]
    RosterCapReached { team: String, cap: usize },

    #[error("{0} is not part of this draft.")]
    UnknownTeam(String),

    #[error("Draft state is corrupt: {0}")]
    CorruptState(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Roster update failed: {0}")]
    Roster(#[from] RosterError),
}

impl DraftError {
    /// True for failures caused by the caller's request rather than by storage
    /// or Discord. These are answered directly instead of being logged.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            DraftError::CorruptState(_) | DraftError::Store(_) | DraftError::Roster(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_separated_from_failures() {
        assert!(DraftError::NotActive.is_rejection());
        assert!(DraftError::RosterCapReached {
            team: "A".into(),
            cap: 53
        }
        .is_rejection());
        assert!(!DraftError::CorruptState("bad".into()).is_rejection());
        assert!(!DraftError::Roster(RosterError::UnknownTeam("A".into())).is_rejection());
    }

    #[test]
    fn messages_name_the_team_on_the_clock() {
        let err = DraftError::NotYourTurn {
            team: "Hawks".into(),
            on_clock: "Bears".into(),
        };
        assert_eq!(
            err.to_string(),
            "It's not Hawks's turn to pick. Bears is on the clock."
        );
    }
}
