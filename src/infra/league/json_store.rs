use crate::core::league::{LeagueConfig, LeagueStore};
use crate::core::store::StoreError;
use crate::infra::json_map_file::JsonMapFile;
use async_trait::async_trait;
use std::path::PathBuf;

pub struct JsonLeagueStore {
    file: JsonMapFile<LeagueConfig>,
}

impl JsonLeagueStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            file: JsonMapFile::open(path)?,
        })
    }
}

#[async_trait]
impl LeagueStore for JsonLeagueStore {
    async fn get_config(&self, guild_id: u64) -> Result<Option<LeagueConfig>, StoreError> {
        Ok(self.file.get(guild_id).await)
    }

    async fn save_config(&self, config: LeagueConfig) -> Result<(), StoreError> {
        self.file.insert(config.guild_id, config).await
    }
}
