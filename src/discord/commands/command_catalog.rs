// Discord commands module.
// Each feature gets its own command file.

pub mod draft;

pub mod league;

// Bot presence management
pub mod presence;
