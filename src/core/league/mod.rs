pub mod league_models;
pub mod league_service;
pub mod league_store;

pub use league_models::LeagueConfig;
pub use league_service::{LeagueError, LeagueService};
pub use league_store::LeagueStore;
