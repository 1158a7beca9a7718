// A JSON file holding one record per guild: { guild_id: record }.
//
// The whole map is cached in memory and the file is rewritten on every change.
// Both JSON stores are thin wrappers around this.

use crate::core::store::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct JsonMapFile<V> {
    path: PathBuf,
    cache: RwLock<HashMap<u64, V>>,
}

impl<V> JsonMapFile<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open the file, or start empty if it does not exist yet.
    ///
    /// A file that exists but does not parse is an error; it is never
    /// silently replaced with an empty map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let map = if path.exists() && std::fs::metadata(&path)?.len() > 0 {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(map),
        })
    }

    pub async fn get(&self, guild_id: u64) -> Option<V> {
        self.cache.read().await.get(&guild_id).cloned()
    }

    pub async fn insert(&self, guild_id: u64, value: V) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(guild_id, value);
        // Keep the write lock while persisting so two saves cannot interleave on disk.
        Self::persist(&self.path, &cache)
    }

    fn persist(path: &Path, map: &HashMap<u64, V>) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, map)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn values_survive_reopen() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_owned();
        drop(tmp);

        let file: JsonMapFile<String> = JsonMapFile::open(path.clone()).unwrap();
        file.insert(1, "one".to_string()).await.unwrap();
        file.insert(2, "two".to_string()).await.unwrap();

        let reopened: JsonMapFile<String> = JsonMapFile::open(path).unwrap();
        assert_eq!(reopened.get(1).await.as_deref(), Some("one"));
        assert_eq!(reopened.get(2).await.as_deref(), Some("two"));
        assert_eq!(reopened.get(3).await, None);
    }

    #[test]
    fn empty_file_opens_as_empty_map() {
        let tmp = NamedTempFile::new().unwrap();
        assert!(JsonMapFile::<String>::open(tmp.path()).is_ok());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{{ not json").unwrap();

        let err = JsonMapFile::<String>::open(tmp.path()).err().unwrap();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
