// Draft service - runs the draft state machine against storage and rosters.
//
// Each guild has its own async mutex. Every mutating operation holds it from
// load to save, so two picks racing for the same draft are applied one after
// the other instead of the second overwriting the first.

use super::draft_error::DraftError;
use super::draft_models::{DraftState, PickRecord, PlayerRef, TeamId};
use super::draft_store::DraftStore;
use super::roster::RosterDirectory;
use chrono::Utc;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of an accepted pick: the new audit record and the state after it.
#[derive(Debug, Clone)]
pub struct PickOutcome {
    pub pick: PickRecord,
    pub state: DraftState,
}

impl PickOutcome {
    /// True if this pick used up the last slot of the draft.
    pub fn concluded_draft(&self) -> bool {
        !self.state.active
    }
}

pub struct DraftService<S: DraftStore> {
    store: S,
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl<S: DraftStore> DraftService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    fn guild_lock(&self, guild_id: u64) -> Arc<Mutex<()>> {
        self.locks.entry(guild_id).or_default().clone()
    }

    async fn load(&self, guild_id: u64) -> Result<DraftState, DraftError> {
        let state = self.store.load(guild_id).await?;
        state.validate().map_err(DraftError::CorruptState)?;
        Ok(state)
    }

    /// Run one transition under the guild lock and persist the result.
    async fn transition<T, F>(&self, guild_id: u64, apply: F) -> Result<(T, DraftState), DraftError>
    where
        F: FnOnce(&mut DraftState) -> Result<T, DraftError> + Send,
        T: Send,
    {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let mut state = self.load(guild_id).await?;
        let value = apply(&mut state)?;
        self.store.save(guild_id, &state).await?;
        Ok((value, state))
    }

    /// Snapshot of the current draft state.
    pub async fn state(&self, guild_id: u64) -> Result<DraftState, DraftError> {
        self.load(guild_id).await
    }

    pub async fn start_draft(
        &self,
        guild_id: u64,
        rounds: u32,
        picks_per_round: u32,
        teams: &[TeamId],
    ) -> Result<DraftState, DraftError> {
        let (_, state) = self
            .transition(guild_id, |state| {
                let mut rng = StdRng::from_entropy();
                state.start(rounds, picks_per_round, teams, &mut rng)
            })
            .await?;

        tracing::info!(
            guild_id,
            rounds,
            picks_per_round,
            teams = teams.len(),
            "Draft started"
        );
        Ok(state)
    }

    pub async fn pause(&self, guild_id: u64) -> Result<DraftState, DraftError> {
        let (_, state) = self.transition(guild_id, DraftState::pause).await?;
        tracing::info!(guild_id, "Draft paused");
        Ok(state)
    }

    pub async fn resume(&self, guild_id: u64) -> Result<DraftState, DraftError> {
        let (_, state) = self.transition(guild_id, DraftState::resume).await?;
        tracing::info!(guild_id, "Draft resumed");
        Ok(state)
    }

    /// Reset the draft. Always succeeds unless storage fails; pick history is kept.
    pub async fn end_draft(&self, guild_id: u64) -> Result<DraftState, DraftError> {
        let (_, state) = self
            .transition(guild_id, |state| {
                state.end();
                Ok(())
            })
            .await?;
        tracing::info!(guild_id, picks = state.picks.len(), "Draft ended");
        Ok(state)
    }

    pub async fn toggle_autopick(&self, guild_id: u64, team: &str) -> Result<bool, DraftError> {
        let (enabled, _) = self
            .transition(guild_id, |state| state.toggle_autopick(team))
            .await?;
        tracing::info!(guild_id, team, enabled, "Autopick toggled");
        Ok(enabled)
    }

    pub async fn team_on_clock(&self, guild_id: u64) -> Result<Option<TeamId>, DraftError> {
        Ok(self.load(guild_id).await?.team_on_clock().map(str::to_string))
    }

    pub async fn describe_order(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(u32, Vec<TeamId>)>, DraftError> {
        Ok(self.load(guild_id).await?.describe_order())
    }

    /// Validate and apply a pick for `team`.
    ///
    /// Checks run in a fixed order and the first failure wins. On success the
    /// advanced state is saved before the player is assigned; if assignment
    /// fails the previous state is written back.
    pub async fn make_pick<R: RosterDirectory + ?Sized>(
        &self,
        guild_id: u64,
        team: &str,
        player: &PlayerRef,
        roster_cap: usize,
        roster: &R,
    ) -> Result<PickOutcome, DraftError> {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let previous = self.load(guild_id).await?;
        previous.check_turn(team)?;

        if let Some(current_team) = roster.team_of(player.id).await? {
            return Err(DraftError::PlayerAlreadyRostered {
                player: player.display_name.clone(),
                team: current_team,
            });
        }
        if roster.roster_size(team).await? >= roster_cap {
            return Err(DraftError::RosterCapReached {
                team: team.to_string(),
                cap: roster_cap,
            });
        }

        let mut state = previous.clone();
        let pick = state.record_pick(team, player, Utc::now());
        self.store.save(guild_id, &state).await?;

        if let Err(err) = roster.assign(player.id, team).await {
            tracing::warn!(
                guild_id,
                team,
                player_id = player.id,
                "Roster assignment failed, rolling back pick: {}",
                err
            );
            if let Err(store_err) = self.store.save(guild_id, &previous).await {
                tracing::error!(guild_id, "Failed to roll back draft state: {}", store_err);
                return Err(store_err.into());
            }
            return Err(err.into());
        }

        tracing::info!(
            guild_id,
            team,
            player_id = player.id,
            round = pick.round,
            pick = pick.pick,
            "Draft pick recorded"
        );
        if !state.active {
            tracing::info!(guild_id, picks = state.picks.len(), "Draft concluded");
        }

        Ok(PickOutcome { pick, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draft::roster::{team_roster, RosterError};
    use crate::core::draft::DraftPhase;
    use crate::infra::draft::InMemoryDraftStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    const GUILD: u64 = 42;

    /// Roster fake: player -> team, with an optional forced assignment failure.
    #[derive(Default)]
    struct FakeRoster {
        members: StdMutex<HashMap<u64, String>>,
        fail_assign: bool,
    }

    impl FakeRoster {
        fn with_member(self, player_id: u64, team: &str) -> Self {
            self.members
                .lock()
                .unwrap()
                .insert(player_id, team.to_string());
            self
        }

        fn failing() -> Self {
            Self {
                fail_assign: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RosterDirectory for FakeRoster {
        async fn team_of(&self, player_id: u64) -> Result<Option<TeamId>, RosterError> {
            Ok(self.members.lock().unwrap().get(&player_id).cloned())
        }

        async fn members(&self, team: &str) -> Result<Vec<PlayerRef>, RosterError> {
            Ok(self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, t)| t.as_str() == team)
                .map(|(id, _)| player(*id))
                .collect())
        }

        async fn assign(&self, player_id: u64, team: &str) -> Result<(), RosterError> {
            if self.fail_assign {
                return Err(RosterError::Assign("missing permissions".to_string()));
            }
            self.members
                .lock()
                .unwrap()
                .insert(player_id, team.to_string());
            Ok(())
        }
    }

    fn teams() -> Vec<TeamId> {
        vec!["A".to_string(), "B".to_string()]
    }

    fn player(id: u64) -> PlayerRef {
        PlayerRef {
            id,
            display_name: format!("Player {}", id),
        }
    }

    fn make_service() -> DraftService<InMemoryDraftStore> {
        DraftService::new(InMemoryDraftStore::new())
    }

    fn other_team(team: &str) -> &'static str {
        if team == "A" {
            "B"
        } else {
            "A"
        }
    }

    #[tokio::test]
    async fn full_draft_runs_to_completion() {
        let service = make_service();
        let roster = FakeRoster::default();

        let state = service.start_draft(GUILD, 2, 2, &teams()).await.unwrap();
        assert_eq!(state.order.len(), 4);
        assert_eq!(state.order.iter().filter(|t| *t == "A").count(), 2);
        assert_eq!(state.order.iter().filter(|t| *t == "B").count(), 2);
        assert_eq!((state.current_round, state.current_pick), (1, 1));

        for player_id in 1..=4u64 {
            let team = service.team_on_clock(GUILD).await.unwrap().unwrap();
            let outcome = service
                .make_pick(GUILD, &team, &player(player_id), 53, &roster)
                .await
                .unwrap();
            assert_eq!(outcome.pick.team, team);
            assert_eq!(outcome.concluded_draft(), player_id == 4);
            assert!(roster.team_of(player_id).await.unwrap().is_some());
        }

        let state = service.state(GUILD).await.unwrap();
        assert_eq!(state.phase(), DraftPhase::Inactive);
        assert_eq!(state.picks.len(), 4);

        let err = service
            .make_pick(GUILD, "A", &player(5), 53, &roster)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::NotActive));
    }

    #[tokio::test]
    async fn second_pick_belongs_to_order_index_one() {
        let service = make_service();
        let roster = FakeRoster::default();
        let state = service.start_draft(GUILD, 2, 2, &teams()).await.unwrap();

        let first = state.order[0].clone();
        let outcome = service
            .make_pick(GUILD, &first, &player(1), 53, &roster)
            .await
            .unwrap();

        assert_eq!((outcome.state.current_round, outcome.state.current_pick), (1, 2));
        assert_eq!(
            service.team_on_clock(GUILD).await.unwrap(),
            Some(state.order[1].clone())
        );
    }

    #[tokio::test]
    async fn out_of_turn_pick_leaves_state_untouched() {
        let service = make_service();
        let roster = FakeRoster::default();
        let before = service.start_draft(GUILD, 2, 2, &teams()).await.unwrap();
        let wrong = other_team(&before.order[0]);

        let err = service
            .make_pick(GUILD, wrong, &player(1), 53, &roster)
            .await
            .unwrap_err();

        assert!(matches!(err, DraftError::NotYourTurn { ref on_clock, .. } if *on_clock == before.order[0]));
        assert_eq!(service.state(GUILD).await.unwrap(), before);
        assert_eq!(roster.team_of(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn paused_draft_rejects_picks_until_resumed() {
        let service = make_service();
        let roster = FakeRoster::default();
        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = service.team_on_clock(GUILD).await.unwrap().unwrap();

        service.pause(GUILD).await.unwrap();
        assert!(matches!(
            service.pause(GUILD).await.unwrap_err(),
            DraftError::AlreadyPaused
        ));
        let err = service
            .make_pick(GUILD, &team, &player(1), 53, &roster)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::DraftPaused));

        service.resume(GUILD).await.unwrap();
        assert!(matches!(
            service.resume(GUILD).await.unwrap_err(),
            DraftError::NotPaused
        ));
        service
            .make_pick(GUILD, &team, &player(1), 53, &roster)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rostered_player_cannot_be_drafted() {
        let service = make_service();
        let roster = FakeRoster::default().with_member(7, "B");
        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = service.team_on_clock(GUILD).await.unwrap().unwrap();

        let err = service
            .make_pick(GUILD, &team, &player(7), 53, &roster)
            .await
            .unwrap_err();

        match err {
            DraftError::PlayerAlreadyRostered { player, team } => {
                assert_eq!(player, "Player 7");
                assert_eq!(team, "B");
            }
            err => panic!("unexpected error: {err}"),
        }
        assert!(service.state(GUILD).await.unwrap().picks.is_empty());
    }

    #[tokio::test]
    async fn full_roster_hits_the_cap() {
        let service = make_service();
        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = service.team_on_clock(GUILD).await.unwrap().unwrap();
        let roster = FakeRoster::default()
            .with_member(100, &team)
            .with_member(101, &team);

        let err = service
            .make_pick(GUILD, &team, &player(1), 2, &roster)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::RosterCapReached { cap: 2, .. }));

        service
            .make_pick(GUILD, &team, &player(1), 3, &roster)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn drafted_players_show_up_on_the_team_roster() {
        let service = make_service();
        let state = service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = state.order[0].clone();
        let roster = FakeRoster::default().with_member(100, &team);

        service
            .make_pick(GUILD, &team, &player(1), 53, &roster)
            .await
            .unwrap();

        let view = team_roster(&roster, &team, 53).await.unwrap();
        let ids: Vec<u64> = view.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 100]);
        assert_eq!(view.open_slots(), 51);
    }

    #[tokio::test]
    async fn failed_assignment_rolls_back_the_pick() {
        let service = make_service();
        let before = service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = before.order[0].clone();

        let err = service
            .make_pick(GUILD, &team, &player(1), 53, &FakeRoster::failing())
            .await
            .unwrap_err();

        assert!(matches!(err, DraftError::Roster(_)));
        assert!(!err.is_rejection());
        assert_eq!(service.state(GUILD).await.unwrap(), before);
    }

    #[tokio::test]
    async fn end_draft_keeps_history_and_allows_restart() {
        let service = make_service();
        let roster = FakeRoster::default();
        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = service.team_on_clock(GUILD).await.unwrap().unwrap();
        service
            .make_pick(GUILD, &team, &player(1), 53, &roster)
            .await
            .unwrap();

        assert!(matches!(
            service.start_draft(GUILD, 1, 2, &teams()).await.unwrap_err(),
            DraftError::AlreadyActive
        ));

        let ended = service.end_draft(GUILD).await.unwrap();
        assert!(!ended.active);
        assert!(ended.order.is_empty());
        assert_eq!(ended.picks.len(), 1);
        assert_eq!(service.team_on_clock(GUILD).await.unwrap(), None);

        service.start_draft(GUILD, 1, 1, &teams()).await.unwrap();
    }

    #[tokio::test]
    async fn autopick_is_stored_per_team() {
        let service = make_service();
        assert!(matches!(
            service.toggle_autopick(GUILD, "A").await.unwrap_err(),
            DraftError::NotActive
        ));

        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        assert!(service.toggle_autopick(GUILD, "A").await.unwrap());

        let state = service.state(GUILD).await.unwrap();
        assert_eq!(state.autopick.get("A"), Some(&true));
        assert_eq!(state.autopick.get("B"), Some(&false));
    }

    #[tokio::test]
    async fn guilds_are_independent() {
        let service = make_service();
        service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();

        assert!(service.state(GUILD + 1).await.unwrap().order.is_empty());
        assert!(service.describe_order(GUILD + 1).await.unwrap().is_empty());
        assert_eq!(service.describe_order(GUILD).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_state_is_reported_not_defaulted() {
        let store = InMemoryDraftStore::new();
        let broken = DraftState {
            active: true,
            ..DraftState::default()
        };
        store.save(GUILD, &broken).await.unwrap();
        let service = DraftService::new(store);

        let err = service.state(GUILD).await.unwrap_err();
        assert!(matches!(err, DraftError::CorruptState(_)));
    }

    #[tokio::test]
    async fn concurrent_picks_are_serialized() {
        let service = Arc::new(make_service());
        let roster = Arc::new(FakeRoster::default());
        let state = service.start_draft(GUILD, 1, 2, &teams()).await.unwrap();
        let team = state.order[0].clone();

        // Both tasks pick for the team on the clock; only one can win.
        let mut handles = Vec::new();
        for player_id in [1u64, 2] {
            let service = Arc::clone(&service);
            let roster = Arc::clone(&roster);
            let team = team.clone();
            handles.push(tokio::spawn(async move {
                service
                    .make_pick(GUILD, &team, &player(player_id), 53, roster.as_ref())
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(DraftError::NotYourTurn { .. }) => {}
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        // If A holds both slots the second pick is legitimate too.
        let expected = if state.order[1] == team { 2 } else { 1 };
        assert_eq!(accepted, expected);
        assert_eq!(service.state(GUILD).await.unwrap().picks.len(), expected);
    }
}
