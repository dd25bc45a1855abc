//! In-memory stand-ins for the external collaborators.
use crate::domain::storage::{
    CacheStore, CatalogStore, PageInvalidator, ReleaseSource, ViewPage, ViewQuery,
};
use crate::domain::release::ReleaseAsset;
use crate::domain::{GameRow, Release};
use crate::error::{Result, SiteError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub fn translation(team: &str, status: &str) -> Value {
    json!({ "team": team, "status": status })
}

pub fn fundraising(team: &str, current: Option<f64>, goal: Option<f64>) -> Value {
    json!({
        "team": team,
        "status": "in-progress",
        "fundraising_current": current,
        "fundraising_goal": goal,
    })
}

pub fn game_row(slug: &str, name: &str, translations: Vec<Value>) -> GameRow {
    GameRow {
        slug: Some(slug.to_string()),
        name: Some(name.to_string()),
        translations: Value::Array(translations),
        ..Default::default()
    }
}

#[derive(Default)]
struct CatalogState {
    requests: Vec<ViewQuery>,
    team_requests: usize,
}

/// Evaluates view queries the way PostgREST would: `ilike` on name, `eq`
/// on slug, name ordering with nulls last, exact counts before ranging.
///
/// A gated catalog reads its rows when a query arrives but holds the answer
/// back until [`MockCatalog::open_gate`].
#[derive(Clone, Default)]
pub struct MockCatalog {
    rows: Arc<Mutex<Vec<GameRow>>>,
    teams: Arc<Vec<String>>,
    failure: Option<String>,
    gate: Option<Arc<Semaphore>>,
    state: Arc<Mutex<CatalogState>>,
}

impl MockCatalog {
    pub fn new(rows: Vec<GameRow>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            ..Default::default()
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn replace_rows(&self, rows: Vec<GameRow>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests().len() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn with_teams(mut self, teams: Vec<&str>) -> Self {
        self.teams = Arc::new(teams.into_iter().map(String::from).collect());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ViewQuery> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn team_requests(&self) -> usize {
        self.state.lock().unwrap().team_requests
    }
}

#[async_trait]
impl CatalogStore for MockCatalog {
    async fn query_view(&self, query: &ViewQuery) -> Result<ViewPage> {
        let page = self.evaluate(query);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        page
    }

    async fn approved_teams(&self) -> Result<Vec<String>> {
        self.state.lock().unwrap().team_requests += 1;
        if let Some(message) = &self.failure {
            return Err(SiteError::Store(message.clone()));
        }
        Ok(self.teams.as_ref().clone())
    }
}

impl MockCatalog {
    fn evaluate(&self, query: &ViewQuery) -> Result<ViewPage> {
        self.state.lock().unwrap().requests.push(query.clone());
        if let Some(message) = &self.failure {
            return Err(SiteError::Store(message.clone()));
        }

        let mut rows: Vec<GameRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| match &query.name_contains {
                Some(text) => row
                    .name
                    .as_ref()
                    .is_some_and(|name| name.to_lowercase().contains(&text.to_lowercase())),
                None => true,
            })
            .filter(|row| match &query.slug {
                Some(slug) => row.slug.as_deref() == Some(slug.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| match (&a.name, &b.name) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let count = query.exact_count.then_some(rows.len());

        if let Some(range) = query.range {
            rows = rows.into_iter().skip(range.offset).take(range.limit).collect();
        }
        if query.head {
            rows.clear();
        }

        Ok(ViewPage { rows, count })
    }
}

pub fn release(tag: &str, assets: &[(&str, u64)]) -> Release {
    Release {
        tag_name: tag.to_string(),
        name: Some(tag.to_string()),
        html_url: None,
        published_at: None,
        assets: assets
            .iter()
            .map(|(name, downloads)| ReleaseAsset {
                name: name.to_string(),
                browser_download_url: format!("https://github.com/releases/download/{tag}/{name}"),
                download_count: *downloads,
            })
            .collect(),
    }
}

/// Release source with per-endpoint failure switches and call counters.
#[derive(Clone)]
pub struct MockReleases {
    latest: Arc<Mutex<Option<Release>>>,
    recent: Arc<Mutex<Option<Vec<Release>>>>,
    latest_calls: Arc<AtomicUsize>,
    recent_calls: Arc<AtomicUsize>,
}

impl MockReleases {
    pub fn new(latest: Release, recent: Vec<Release>) -> Self {
        Self {
            latest: Arc::new(Mutex::new(Some(latest))),
            recent: Arc::new(Mutex::new(Some(recent))),
            latest_calls: Arc::new(AtomicUsize::new(0)),
            recent_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_latest(&self) {
        *self.latest.lock().unwrap() = None;
    }

    pub fn fail_recent(&self) {
        *self.recent.lock().unwrap() = None;
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for MockReleases {
    async fn latest_release(&self) -> Result<Release> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.latest
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SiteError::Upstream("Failed to fetch latest release: 503".into()))
    }

    async fn recent_releases(&self, _per_page: u32) -> Result<Vec<Release>> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.recent
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SiteError::Upstream("Failed to fetch releases: 403".into()))
    }
}

/// Shared key-value cache that remembers every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    puts: Arc<Mutex<Vec<(String, Duration)>>>,
    by_url: bool,
}

impl MemoryStore {
    pub fn url_keyed() -> Self {
        Self {
            by_url: true,
            ..Default::default()
        }
    }

    pub fn puts(&self) -> Vec<(String, Duration)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    pub fn set(&self, key: &str, value: String) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn keyed_by_url(&self) -> bool {
        self.by_url
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.puts.lock().unwrap().push((key.to_string(), ttl));
        self.set(key, value);
        Ok(())
    }
}

/// A cache store whose backend is unreachable.
pub struct BrokenStore;

fn refused() -> SiteError {
    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused").into()
}

#[async_trait]
impl CacheStore for BrokenStore {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(refused())
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(refused())
    }
}

#[derive(Clone, Default)]
pub struct RecordingInvalidator {
    paths: Arc<Mutex<Vec<String>>>,
}

impl RecordingInvalidator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageInvalidator for RecordingInvalidator {
    async fn invalidate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}
