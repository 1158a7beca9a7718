// Discord layer - commands and the adapters the draft needs from Discord.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "draft/mod.rs"]
pub mod draft;

// Re-export command types for convenience
pub use commands::draft::{Context, Data, Error};
