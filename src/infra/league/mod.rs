pub mod json_store;

pub use json_store::JsonLeagueStore;
