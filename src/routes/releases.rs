use super::{request_url, AppState};
use crate::domain::{DownloadLinks, Platform, Release};
use crate::error::ApiError;
use crate::services::CacheStatus;
use axum::{
    extract::{OriginalUri, State},
    http::{
        header::{CACHE_CONTROL, USER_AGENT, WARNING},
        HeaderMap, HeaderName, HeaderValue, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

pub const RELEASES_PATH: &str = "/api/github-releases";

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePayload<'a> {
    latest: &'a Release,
    total_downloads: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadsPayload {
    #[serde(flatten)]
    links: DownloadLinks,
    detected_os: Platform,
}

pub async fn github_releases(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let url = request_url(&headers, &uri);

    let lookup = match state.releases.latest_release(&url).await {
        Ok(lookup) => lookup,
        Err(e) => {
            error!("Release lookup failed: {e}");
            return ApiError::new("Failed to fetch releases", e).into_response();
        }
    };

    let mut response = Json(ReleasePayload {
        latest: &lookup.snapshot.latest,
        total_downloads: lookup.snapshot.total_downloads,
    })
    .into_response();

    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&state.releases.policy().cache_control()) {
        response_headers.insert(CACHE_CONTROL, value);
    }
    response_headers.insert(X_CACHE, HeaderValue::from_static(lookup.status.as_str()));
    if lookup.status == CacheStatus::Stale {
        response_headers.insert(
            WARNING,
            HeaderValue::from_static("110 - \"Response is Stale\""),
        );
    }

    response
}

pub async fn downloads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<DownloadsPayload> {
    let detected_os = headers
        .get(USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map_or(Platform::Unknown, Platform::detect);

    // Shares the cache entry with the release endpoint.
    let url = request_url(&headers, &Uri::from_static(RELEASES_PATH));
    let links = state.releases.download_links(&url).await;

    Json(DownloadsPayload { links, detected_os })
}
