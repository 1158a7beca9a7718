// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "json_map_file.rs"]
pub mod json_map_file;

#[path = "draft/mod.rs"]
pub mod draft;

#[path = "league/mod.rs"]
pub mod league;
