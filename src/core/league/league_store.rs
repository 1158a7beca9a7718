use super::league_models::LeagueConfig;
use crate::core::store::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn get_config(&self, guild_id: u64) -> Result<Option<LeagueConfig>, StoreError>;
    async fn save_config(&self, config: LeagueConfig) -> Result<(), StoreError>;
}
