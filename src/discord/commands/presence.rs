// Bot presence shown in the member list.

use poise::serenity_prelude as serenity;

/// Show the draft board as the bot's activity.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("the draft board");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
