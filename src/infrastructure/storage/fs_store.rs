use crate::domain::storage::{CacheStore, StorageKeys};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    expires_at: DateTime<Utc>,
    value: String,
}

/// Cache entries as JSON files, one per key. Meant for local development
/// where neither an edge cache nor Redis is around.
#[derive(Clone)]
pub struct FileSystemStore {
    cache_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    fn get_path_for_key(&self, key: &str) -> PathBuf {
        let filename: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();

        self.cache_dir
            .join(StorageKeys::RELEASES_DIR)
            .join(format!("{}.json", filename))
    }

    async fn write_json_file<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.get_path_for_key(key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let content = serde_json::to_string_pretty(data)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    async fn read_json_file<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.get_path_for_key(key);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[async_trait]
impl CacheStore for FileSystemStore {
    fn name(&self) -> &'static str {
        "fs"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(entry) = self.read_json_file::<StoredEntry>(key).await? else {
            return Ok(None);
        };

        if entry.expires_at <= Utc::now() {
            debug!("Cache file for {key} expired at {}", entry.expires_at);
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.write_json_file(key, &StoredEntry { expires_at, value })
            .await
    }
}
