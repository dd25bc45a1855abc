use super::AppState;
use crate::error::{ApiError, SiteError};
use crate::services::RevalidateRequest;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

pub const SECRET_HEADER: &str = "x-revalidate-secret";

/// The secret is checked before the body is parsed.
pub async fn revalidate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let secret = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());

    if let Err(e) = state.revalidation.authorize(secret) {
        warn!("Rejected revalidation request");
        return ApiError::new("Invalid secret", e).into_response();
    }

    let request: RevalidateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let e = SiteError::BadRequest(format!("Invalid JSON body: {e}"));
            return ApiError::new("Invalid request", e).into_response();
        }
    };

    match state.revalidation.revalidate(secret, request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => ApiError::new("Failed to revalidate", e).into_response(),
    }
}
