// In-memory draft store. Nothing survives a restart; used by the service tests.

use crate::core::draft::{DraftState, DraftStore};
use crate::core::store::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct InMemoryDraftStore {
    states: DashMap<u64, DraftState>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn load(&self, guild_id: u64) -> Result<DraftState, StoreError> {
        Ok(self
            .states
            .get(&guild_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn save(&self, guild_id: u64, state: &DraftState) -> Result<(), StoreError> {
        self.states.insert(guild_id, state.clone());
        Ok(())
    }
}
