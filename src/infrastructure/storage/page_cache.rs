use crate::domain::storage::PageInvalidator;
use async_trait::async_trait;
use moka::future::Cache;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
struct PageEntry {
    generation: u64,
    body: Arc<String>,
}

/// Rendered catalog pages keyed by path. A page stays until the
/// revalidation endpoint invalidates it or the safety ttl runs out.
///
/// Every path carries a generation that [`PageInvalidator::invalidate`]
/// bumps. A render records the generation it started from, and an entry
/// written for an older generation is never served.
pub struct PageCache {
    pages: Cache<String, PageEntry>,
    generations: Mutex<FxHashMap<String, u64>>,
}

impl PageCache {
    pub fn new(safety_ttl: Duration) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(safety_ttl)
                .build(),
            generations: Mutex::new(FxHashMap::default()),
        }
    }

    /// Current generation of `path`, to be taken before rendering it.
    pub fn generation(&self, path: &str) -> u64 {
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        generations.get(path).copied().unwrap_or(0)
    }

    pub async fn get(&self, path: &str) -> Option<Arc<String>> {
        let entry = self.pages.get(path).await?;
        if entry.generation != self.generation(path) {
            debug!("Ignoring page {path} rendered before its last invalidation");
            return None;
        }
        Some(entry.body)
    }

    /// Stores a page rendered from `generation`. A page whose path was
    /// invalidated since is handed back but not served from the cache.
    pub async fn insert(&self, path: &str, generation: u64, body: String) -> Arc<String> {
        let body = Arc::new(body);
        if generation == self.generation(path) {
            let entry = PageEntry {
                generation,
                body: Arc::clone(&body),
            };
            self.pages.insert(path.to_string(), entry).await;
        }
        body
    }
}

#[async_trait]
impl PageInvalidator for PageCache {
    async fn invalidate(&self, path: &str) {
        {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *generations.entry(path.to_string()).or_default() += 1;
        }

        info!("Invalidating page {path}");
        self.pages.invalidate(path).await;
    }
}
