use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub download_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Tag with a single leading `v` removed, for display only.
    pub fn version(&self) -> &str {
        self.tag_name
            .strip_prefix('v')
            .unwrap_or(self.tag_name.as_str())
    }
}

/// Cached result of one upstream refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSnapshot {
    pub latest: Release,
    pub total_downloads: u64,
    pub fetched_at: DateTime<Utc>,
}

impl ReleaseSnapshot {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Every asset of every release contributes its counter.
pub fn total_downloads(releases: &[Release]) -> u64 {
    releases
        .iter()
        .flat_map(|release| release.assets.iter())
        .map(|asset| asset.download_count)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Macos,
    Linux,
    Unknown,
}

impl Platform {
    pub fn classify(asset_name: &str) -> Option<Platform> {
        if asset_name.ends_with("Setup.exe") {
            Some(Platform::Windows)
        } else if asset_name.ends_with(".dmg") {
            Some(Platform::Macos)
        } else if asset_name.ends_with(".AppImage") {
            Some(Platform::Linux)
        } else {
            None
        }
    }

    pub fn detect(user_agent: &str) -> Platform {
        let user_agent = user_agent.to_lowercase();

        if user_agent.contains("win") {
            Platform::Windows
        } else if user_agent.contains("mac") {
            Platform::Macos
        } else if user_agent.contains("linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLinks {
    pub windows: Option<String>,
    pub macos: Option<String>,
    pub linux: Option<String>,
    pub version: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub total_downloads: u64,
}

impl DownloadLinks {
    pub fn empty() -> Self {
        Self {
            windows: None,
            macos: None,
            linux: None,
            version: None,
            published_at: None,
            total_downloads: 0,
        }
    }

    pub fn from_release(release: &Release, total_downloads: u64) -> Self {
        let first_for = |platform: Platform| {
            release
                .assets
                .iter()
                .find(|asset| Platform::classify(&asset.name) == Some(platform))
                .map(|asset| asset.browser_download_url.clone())
        };

        Self {
            windows: first_for(Platform::Windows),
            macos: first_for(Platform::Macos),
            linux: first_for(Platform::Linux),
            version: Some(release.version().to_string()),
            published_at: release.published_at,
            total_downloads,
        }
    }
}
