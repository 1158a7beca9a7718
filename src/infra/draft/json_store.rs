use crate::core::draft::{DraftState, DraftStore};
use crate::core::store::StoreError;
use crate::infra::json_map_file::JsonMapFile;
use async_trait::async_trait;
use std::path::PathBuf;

/// Draft state for every guild in one JSON file.
pub struct JsonDraftStore {
    file: JsonMapFile<DraftState>,
}

impl JsonDraftStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            file: JsonMapFile::open(path)?,
        })
    }
}

#[async_trait]
impl DraftStore for JsonDraftStore {
    async fn load(&self, guild_id: u64) -> Result<DraftState, StoreError> {
        Ok(self.file.get(guild_id).await.unwrap_or_default())
    }

    async fn save(&self, guild_id: u64, state: &DraftState) -> Result<(), StoreError> {
        self.file.insert(guild_id, state.clone()).await
    }
}
