use super::{GameRow, Release};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Row range of a bounded view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: usize,
    pub limit: usize,
}

/// A request against the `games_grouped` view. Results are always ordered
/// by name ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Case-insensitive substring match on the name column.
    pub name_contains: Option<String>,
    pub slug: Option<String>,
    pub range: Option<RowRange>,
    pub exact_count: bool,
    /// Count only, no rows.
    pub head: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ViewPage {
    pub rows: Vec<GameRow>,
    pub count: Option<usize>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn query_view(&self, query: &ViewQuery) -> Result<ViewPage>;
    /// Team column of every approved translation row, duplicates included.
    async fn approved_teams(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<Release>;
    async fn recent_releases(&self, per_page: u32) -> Result<Vec<Release>>;
}

/// Backing store of the release cache. Values are opaque JSON strings.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Edge-style stores key entries by request URL rather than a fixed key.
    fn keyed_by_url(&self) -> bool {
        false
    }

    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

#[async_trait]
pub trait PageInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

pub struct StorageKeys;

impl StorageKeys {
    pub const RELEASES_DIR: &'static str = "releases";

    pub const LATEST_RELEASE: &'static str = "github:releases:latest";

    pub const GAMES_VIEW: &'static str = "games_grouped";
    pub const GAMES_TABLE: &'static str = "games";
}
