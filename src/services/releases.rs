use crate::domain::storage::{CacheStore, ReleaseSource, StorageKeys};
use crate::domain::{total_downloads, DownloadLinks, ReleaseSnapshot};
use crate::error::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Releases summed for the download counter.
pub const RECENT_RELEASES_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Expired snapshot served because the upstream fetch failed.
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseLookup {
    pub snapshot: ReleaseSnapshot,
    pub status: CacheStatus,
}

#[derive(Debug, Clone, Copy)]
pub struct ReleasePolicy {
    pub ttl: Duration,
    pub stale_while_revalidate: Duration,
    pub stale_retention: Duration,
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            stale_while_revalidate: Duration::from_secs(60),
            stale_retention: Duration::from_secs(86_400),
        }
    }
}

impl ReleasePolicy {
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.ttl.as_secs(),
            self.stale_while_revalidate.as_secs()
        )
    }

    /// How long the backing store keeps an entry: freshness plus the window
    /// in which it may still be served when GitHub is down.
    fn retention(&self) -> Duration {
        self.ttl + self.stale_retention
    }
}

/// Read-through cache in front of the GitHub release API.
pub struct ReleaseService {
    source: Arc<dyn ReleaseSource>,
    store: Arc<dyn CacheStore>,
    policy: ReleasePolicy,
}

impl ReleaseService {
    pub fn new(
        source: Arc<dyn ReleaseSource + 'static>,
        store: Arc<dyn CacheStore + 'static>,
        policy: ReleasePolicy,
    ) -> Self {
        Self {
            source,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &ReleasePolicy {
        &self.policy
    }

    fn cache_key<'a>(&self, request_url: &'a str) -> &'a str {
        if self.store.keyed_by_url() {
            request_url
        } else {
            StorageKeys::LATEST_RELEASE
        }
    }

    pub async fn latest_release(&self, request_url: &str) -> Result<ReleaseLookup> {
        let key = self.cache_key(request_url);
        let cached = self.read_cached(key).await;

        let ttl = chrono::Duration::from_std(self.policy.ttl).unwrap_or(chrono::Duration::MAX);
        if let Some(snapshot) = &cached {
            if snapshot.is_fresh(Utc::now(), ttl) {
                return Ok(ReleaseLookup {
                    snapshot: snapshot.clone(),
                    status: CacheStatus::Hit,
                });
            }
        }

        match self.fetch_upstream().await {
            Ok(snapshot) => {
                self.write_cached(key, &snapshot).await;
                Ok(ReleaseLookup {
                    snapshot,
                    status: CacheStatus::Miss,
                })
            }
            Err(e) => match cached {
                Some(snapshot) => {
                    warn!(
                        "Serving stale release snapshot from {} after upstream failure: {e}",
                        snapshot.fetched_at
                    );
                    Ok(ReleaseLookup {
                        snapshot,
                        status: CacheStatus::Stale,
                    })
                }
                None => Err(e),
            },
        }
    }

    /// Platform links for the landing page. Any failure yields empty links.
    pub async fn download_links(&self, request_url: &str) -> DownloadLinks {
        match self.latest_release(request_url).await {
            Ok(lookup) => DownloadLinks::from_release(
                &lookup.snapshot.latest,
                lookup.snapshot.total_downloads,
            ),
            Err(e) => {
                warn!("No release data for download links: {e}");
                DownloadLinks::empty()
            }
        }
    }

    async fn fetch_upstream(&self) -> Result<ReleaseSnapshot> {
        let (latest, recent) = tokio::join!(
            self.source.latest_release(),
            self.source.recent_releases(RECENT_RELEASES_PAGE)
        );

        let latest = latest?;
        let total_downloads = match recent {
            Ok(releases) => total_downloads(&releases),
            Err(e) => {
                warn!("Could not list recent releases, reporting 0 downloads: {e}");
                0
            }
        };

        info!(
            "Fetched release {} with {total_downloads} total downloads",
            latest.tag_name
        );

        Ok(ReleaseSnapshot {
            latest,
            total_downloads,
            fetched_at: Utc::now(),
        })
    }

    async fn read_cached(&self, key: &str) -> Option<ReleaseSnapshot> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("{} cache read failed, treating as miss: {e}", self.store.name());
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| warn!("Discarding unreadable cached release: {e}"))
            .ok()
    }

    async fn write_cached(&self, key: &str, snapshot: &ReleaseSnapshot) {
        let value = match serde_json::to_string(snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize release snapshot: {e}");
                return;
            }
        };

        if let Err(e) = self.store.put(key, value, self.policy.retention()).await {
            warn!("{} cache write failed: {e}", self.store.name());
        }
    }
}
