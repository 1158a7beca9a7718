// Discord-side pieces of the draft: role-backed rosters and announcement embeds.

pub mod announcements;
pub mod guild_roster;
