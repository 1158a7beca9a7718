// Team rosters backed by Discord roles.
//
// A player is on a team when they hold the role named after it. Role ids are
// resolved once from the cache when the roster is built. Members always come
// from the HTTP API: the gateway only delivers part of the member list for
// large guilds, and a partial list would undercount rosters against the cap.

use crate::core::draft::{PlayerRef, RosterDirectory, RosterError, TeamId};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Discord's maximum page size for listing guild members.
const MEMBER_PAGE_SIZE: u64 = 1000;

pub struct GuildRoster {
    guild_id: serenity::GuildId,
    http: Arc<serenity::Http>,
    team_roles: HashMap<TeamId, serenity::RoleId>,
}

impl GuildRoster {
    /// Build a roster view for the registered `teams` of a guild.
    ///
    /// Teams without a matching role are left out; picking for them fails with
    /// `RosterError::UnknownTeam`.
    pub fn new(
        ctx: &serenity::Context,
        guild_id: serenity::GuildId,
        teams: &[TeamId],
    ) -> Result<Self, RosterError> {
        let team_roles = {
            let guild = ctx
                .cache
                .guild(guild_id)
                .ok_or_else(|| RosterError::Lookup("guild is not cached".to_string()))?;
            team_role_ids(&guild, teams)
        };

        Ok(Self {
            guild_id,
            http: Arc::clone(&ctx.http),
            team_roles,
        })
    }

    fn role_for(&self, team: &str) -> Result<serenity::RoleId, RosterError> {
        self.team_roles
            .get(team)
            .copied()
            .ok_or_else(|| RosterError::UnknownTeam(team.to_string()))
    }

    async fn all_members(&self) -> Result<Vec<serenity::Member>, RosterError> {
        let http = Arc::clone(&self.http);
        let guild_id = self.guild_id;
        fetch_all_pages(
            MEMBER_PAGE_SIZE,
            move |after| {
                let http = Arc::clone(&http);
                async move {
                    http.get_guild_members(guild_id, Some(MEMBER_PAGE_SIZE), after)
                        .await
                }
            },
            |member: &serenity::Member| member.user.id.get(),
        )
        .await
        .map_err(|e| RosterError::Lookup(e.to_string()))
    }
}

/// Walk a cursor-paged listing until a short page comes back.
///
/// `fetch` receives the cursor of the last item seen (`None` for the first
/// page); `cursor` extracts that value from an item.
async fn fetch_all_pages<T, E, F, Fut>(
    page_size: u64,
    mut fetch: F,
    cursor: impl Fn(&T) -> u64,
) -> Result<Vec<T>, E>
where
    F: FnMut(Option<u64>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut items = Vec::new();
    let mut after = None;
    loop {
        let page = fetch(after).await?;
        let full_page = page.len() as u64 >= page_size;
        after = page.last().map(&cursor);
        items.extend(page);
        if !full_page || after.is_none() {
            return Ok(items);
        }
    }
}

/// Map team names to the ids of the guild roles with the same name.
pub fn team_role_ids(guild: &serenity::Guild, teams: &[TeamId]) -> HashMap<TeamId, serenity::RoleId> {
    teams
        .iter()
        .filter_map(|team| guild.role_by_name(team).map(|role| (team.clone(), role.id)))
        .collect()
}

/// The registered team a member belongs to, judged by their roles.
pub fn member_team(
    team_roles: &HashMap<TeamId, serenity::RoleId>,
    member_roles: &[serenity::RoleId],
) -> Option<TeamId> {
    team_roles
        .iter()
        .find(|(_, role_id)| member_roles.contains(role_id))
        .map(|(team, _)| team.clone())
}

#[async_trait]
impl RosterDirectory for GuildRoster {
    async fn team_of(&self, player_id: u64) -> Result<Option<TeamId>, RosterError> {
        let member = self
            .http
            .get_member(self.guild_id, serenity::UserId::new(player_id))
            .await
            .map_err(|e| RosterError::Lookup(e.to_string()))?;
        Ok(member_team(&self.team_roles, &member.roles))
    }

    async fn members(&self, team: &str) -> Result<Vec<PlayerRef>, RosterError> {
        let role_id = self.role_for(team)?;
        Ok(self
            .all_members()
            .await?
            .iter()
            .filter(|member| member.roles.contains(&role_id))
            .map(|member| PlayerRef {
                id: member.user.id.get(),
                display_name: member.display_name().to_string(),
            })
            .collect())
    }

    async fn assign(&self, player_id: u64, team: &str) -> Result<(), RosterError> {
        let role_id = self.role_for(team)?;
        self.http
            .add_member_role(
                self.guild_id,
                serenity::UserId::new(player_id),
                role_id,
                Some("Draft pick"),
            )
            .await
            .map_err(|e| RosterError::Assign(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn member_team_matches_on_role_ids() {
        let mut team_roles = HashMap::new();
        team_roles.insert("Hawks".to_string(), serenity::RoleId::new(10));
        team_roles.insert("Bears".to_string(), serenity::RoleId::new(20));

        let roles = [serenity::RoleId::new(5), serenity::RoleId::new(20)];
        assert_eq!(member_team(&team_roles, &roles), Some("Bears".to_string()));
        assert_eq!(member_team(&team_roles, &[serenity::RoleId::new(5)]), None);
        assert_eq!(member_team(&HashMap::new(), &roles), None);
    }

    /// Serves ids 1..=total in pages of `page_size`, like the member listing.
    fn paged_ids(
        total: u64,
        page_size: u64,
        calls: &AtomicUsize,
    ) -> impl FnMut(Option<u64>) -> std::future::Ready<Result<Vec<u64>, String>> + '_ {
        move |after| {
            calls.fetch_add(1, Ordering::SeqCst);
            let start = after.unwrap_or(0) + 1;
            let end = (start + page_size - 1).min(total);
            std::future::ready(Ok((start..=end).collect()))
        }
    }

    #[tokio::test]
    async fn every_page_is_collected_for_large_guilds() {
        let calls = AtomicUsize::new(0);
        let ids = fetch_all_pages(1000, paged_ids(2500, 1000, &calls), |id| *id)
            .await
            .unwrap();

        assert_eq!(ids.len(), 2500);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&2500));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exact_multiple_ends_on_an_empty_page() {
        let calls = AtomicUsize::new(0);
        let ids = fetch_all_pages(1000, paged_ids(2000, 1000, &calls), |id| *id)
            .await
            .unwrap();

        assert_eq!(ids.len(), 2000);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn page_errors_are_returned() {
        let result: Result<Vec<u64>, String> = fetch_all_pages(
            10,
            |_| std::future::ready(Err("rate limited".to_string())),
            |id| *id,
        )
        .await;
        assert_eq!(result.unwrap_err(), "rate limited");
    }
}
