use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationStatus {
    Completed,
    InProgress,
    Planned,
    #[serde(other)]
    Unknown,
}

impl TranslationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::Completed => "completed",
            TranslationStatus::InProgress => "in-progress",
            TranslationStatus::Planned => "planned",
            TranslationStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(TranslationStatus::Completed),
            "in-progress" => Ok(TranslationStatus::InProgress),
            "planned" => Ok(TranslationStatus::Planned),
            other => Err(format!("unknown translation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub team: Option<String>,
    pub status: TranslationStatus,
    #[serde(default)]
    pub fundraising_current: Option<f64>,
    #[serde(default)]
    pub fundraising_goal: Option<f64>,
}

impl Translation {
    /// Substring match, so "Team A" matches a joint credit like "Team A & Team B".
    pub fn team_contains(&self, needle: &str) -> bool {
        self.team.as_deref().is_some_and(|team| team.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub slug: String,
    pub name: String,
    pub banner_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub is_adult: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub translations: Vec<Translation>,
}

impl Game {
    pub fn has_status(&self, status: TranslationStatus) -> bool {
        self.translations.iter().any(|t| t.status == status)
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.translations.iter().any(|t| t.team_contains(team))
    }
}

/// One row of the `games_grouped` view. Every column is nullable on the
/// database side, so nothing is trusted until [`GameRow::into_game`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameRow {
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub banner_path: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub is_adult: Option<bool>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub translations: serde_json::Value,
}

impl GameRow {
    /// Rows without a slug or name are incomplete and yield `None`.
    pub fn into_game(self) -> Option<Game> {
        let (Some(slug), Some(name)) = (self.slug, self.name) else {
            return None;
        };

        Some(Game {
            slug,
            name,
            banner_path: self.banner_path,
            thumbnail_path: self.thumbnail_path,
            is_adult: self.is_adult.unwrap_or(false),
            updated_at: self.updated_at,
            translations: parse_translations(self.translations),
        })
    }
}

pub fn parse_translations(value: serde_json::Value) -> Vec<Translation> {
    let serde_json::Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(translation) => Some(translation),
            Err(e) => {
                debug!("Skipping malformed translation entry: {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesPage<T = Game> {
    pub games: Vec<T>,
    pub total: usize,
    pub has_more: bool,
    pub next_offset: usize,
}

impl<T> GamesPage<T> {
    pub fn new(games: Vec<T>, total: usize, offset: usize, limit: usize) -> Self {
        Self {
            games,
            total,
            has_more: offset.saturating_add(limit) < total,
            next_offset: offset.saturating_add(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> GamesPage<U> {
        GamesPage {
            games: self.games.into_iter().map(f).collect(),
            total: self.total,
            has_more: self.has_more,
            next_offset: self.next_offset,
        }
    }
}
