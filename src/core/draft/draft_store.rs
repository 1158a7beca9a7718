use super::draft_models::DraftState;
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Persistence port for draft state. The draft service is the only writer.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Current state for a guild, or the default inactive state if none was saved yet.
    async fn load(&self, guild_id: u64) -> Result<DraftState, StoreError>;

    /// Replace the stored state for a guild.
    async fn save(&self, guild_id: u64, state: &DraftState) -> Result<(), StoreError>;
}
