// Draft sequencing: turn order, pick validation and advancement.
// Nothing in here knows about Discord; rosters and storage come in through traits.

pub mod draft_error;
pub mod draft_models;
pub mod draft_service;
pub mod draft_store;
pub mod roster;

pub use draft_error::DraftError;
pub use draft_models::{DraftPhase, DraftState, PickRecord, PlayerRef, TeamId};
pub use draft_service::{DraftService, PickOutcome};
pub use draft_store::DraftStore;
pub use roster::{team_roster, RosterDirectory, RosterError, TeamRoster};
