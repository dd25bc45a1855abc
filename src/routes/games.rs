use super::{AppState, MAX_PAGE_SIZE};
use crate::domain::{Game, GamesPage, Translation};
use crate::error::{ApiError, Result};
use crate::services::{parse_status_filter, FundraisingProgress, ImageResolver, SearchQuery};
use crate::utils::team_slug;
use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

#[derive(Debug, Default, Deserialize)]
pub struct GamesParams {
    offset: Option<usize>,
    limit: Option<usize>,
    search: Option<String>,
    status: Option<String>,
    team: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationView {
    #[serde(flatten)]
    pub translation: Translation,
    pub team_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundraising: Option<FundraisingProgress>,
}

impl TranslationView {
    fn new(translation: Translation) -> Self {
        Self {
            team_slug: translation.team.as_deref().map(team_slug),
            fundraising: FundraisingProgress::for_translation(&translation),
            translation,
        }
    }
}

/// A game as rendered for the site, with resolved image URLs.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub slug: String,
    pub name: String,
    pub banner_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub banner_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_adult: bool,
    pub translations: Vec<TranslationView>,
}

impl GameView {
    pub fn new(game: Game, images: &ImageResolver) -> Self {
        Self {
            banner_url: images.url(game.banner_path.as_deref(), game.updated_at),
            thumbnail_url: images.url(game.thumbnail_path.as_deref(), game.updated_at),
            slug: game.slug,
            name: game.name,
            banner_path: game.banner_path,
            thumbnail_path: game.thumbnail_path,
            is_adult: game.is_adult,
            translations: game.translations.into_iter().map(TranslationView::new).collect(),
        }
    }
}

fn search_query(params: GamesParams, page_size: usize) -> Result<SearchQuery> {
    let limit = params.limit.unwrap_or(page_size).clamp(1, MAX_PAGE_SIZE);
    let mut query = SearchQuery::new(params.offset.unwrap_or(0), limit);

    if let Some(status) = parse_status_filter(params.status.as_deref())? {
        query = query.status(status);
    }
    if let Some(text) = params.search {
        query = query.text(text.trim());
    }
    if let Some(team) = params.team {
        query = query.team(team);
    }
    Ok(query)
}

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GamesParams>,
) -> std::result::Result<Json<GamesPage<GameView>>, ApiError> {
    let query = search_query(params, state.page_size)
        .map_err(|e| ApiError::new("Invalid query", e))?;

    let page = state
        .catalog
        .search(&query)
        .await
        .map_err(|e| ApiError::new("Failed to load games", e))?;

    Ok(Json(page.map(|game| GameView::new(game, &state.images))))
}

pub async fn count_games(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.count().await {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(e) => ApiError::new("Failed to count games", e).into_response(),
    }
}

pub async fn list_teams(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.teams().await {
        Ok(teams) => Json(teams.as_ref().clone()).into_response(),
        Err(e) => ApiError::new("Failed to load teams", e).into_response(),
    }
}

/// Serves `path` from the page cache, rendering it on a miss. A render
/// returning `None` is a 404 and is not cached.
async fn cached_page<F, Fut>(state: &AppState, path: &str, render: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    if let Some(body) = state.pages.get(path).await {
        return page_response(body.as_ref().clone(), "HIT");
    }

    let generation = state.pages.generation(path);
    match render().await {
        Ok(Some(body)) => {
            debug!("Rendered {path}");
            let body = state.pages.insert(path, generation, body).await;
            page_response(body.as_ref().clone(), "MISS")
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Game not found" })),
        )
            .into_response(),
        Err(e) => ApiError::new("Failed to render page", e).into_response(),
    }
}

fn page_response(body: String, cache: &'static str) -> Response {
    (
        [(CONTENT_TYPE, "application/json"), (X_CACHE, cache)],
        body,
    )
        .into_response()
}

pub async fn games_page(State(state): State<Arc<AppState>>) -> Response {
    cached_page(&state, "/games", || render_list(&state)).await
}

pub async fn game_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let path = format!("/games/{slug}");
    cached_page(&state, &path, || render_game(&state, &slug, None)).await
}

/// A game narrowed to the translations of one team, addressed by team slug.
pub async fn team_page(
    State(state): State<Arc<AppState>>,
    Path((slug, team)): Path<(String, String)>,
) -> Response {
    let path = format!("/games/{slug}/{team}");
    cached_page(&state, &path, || render_game(&state, &slug, Some(&team))).await
}

async fn render_list(state: &AppState) -> Result<Option<String>> {
    let page = state
        .catalog
        .search(&SearchQuery::new(0, state.page_size))
        .await?;
    let page = page.map(|game| GameView::new(game, &state.images));

    Ok(Some(serde_json::to_string(&page)?))
}

async fn render_game(state: &AppState, slug: &str, team: Option<&str>) -> Result<Option<String>> {
    let Some(game) = state.catalog.game(slug).await? else {
        return Ok(None);
    };

    let mut view = GameView::new(game, &state.images);
    if let Some(team) = team {
        view.translations
            .retain(|t| t.team_slug.as_deref() == Some(team));
        if view.translations.is_empty() {
            return Ok(None);
        }
    }

    Ok(Some(serde_json::to_string(&view)?))
}
