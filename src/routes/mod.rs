use crate::infrastructure::PageCache;
use crate::services::{CatalogService, ImageResolver, ReleaseService, RevalidationService};
use axum::{
    http::{header::HOST, HeaderMap, Method, Uri},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

mod games;
mod releases;
mod revalidate;

/// Upper bound for the `limit` query parameter.
pub const MAX_PAGE_SIZE: usize = 100;

pub struct AppState {
    pub catalog: CatalogService,
    pub releases: ReleaseService,
    pub revalidation: RevalidationService,
    pub pages: Arc<PageCache>,
    pub images: ImageResolver,
    pub page_size: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/games", get(games::list_games))
        .route("/api/games/count", get(games::count_games))
        .route("/api/teams", get(games::list_teams))
        .route(releases::RELEASES_PATH, get(releases::github_releases))
        .route("/api/downloads", get(releases::downloads))
        .route("/api/revalidate", post(revalidate::revalidate))
        .route("/games", get(games::games_page))
        .route("/games/{slug}", get(games::game_page))
        .route("/games/{slug}/{team}", get(games::team_page))
        .layer(cors)
        .with_state(state)
}

/// Absolute URL of the current request, used as the edge cache key.
fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map_or("/", |p| p.as_str());

    format!("http://{host}{path}")
}
