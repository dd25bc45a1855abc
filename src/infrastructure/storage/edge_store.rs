use crate::domain::storage::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct EdgeEntry {
    expires_at: Instant,
    body: String,
}

/// In-process response cache keyed by request URL. Entries are evicted by
/// moka after the retention window and ignored once their own ttl passes.
#[derive(Clone)]
pub struct EdgeStore {
    responses: Cache<String, EdgeEntry>,
}

impl EdgeStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            responses: Cache::builder()
                .max_capacity(1024)
                .time_to_live(retention)
                .build(),
        }
    }
}

#[async_trait]
impl CacheStore for EdgeStore {
    fn name(&self) -> &'static str {
        "edge"
    }

    fn keyed_by_url(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .responses
            .get(key)
            .await
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.body))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = EdgeEntry {
            expires_at: Instant::now() + ttl,
            body: value,
        };
        self.responses.insert(key.to_string(), entry).await;
        Ok(())
    }
}
