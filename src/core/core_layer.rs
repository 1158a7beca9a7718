// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "store_error.rs"]
pub mod store;

#[path = "draft/mod.rs"]
pub mod draft;

#[path = "league/mod.rs"]
pub mod league;
