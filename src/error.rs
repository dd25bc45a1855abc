use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Invalid secret")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

impl SiteError {
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::Unauthorized => StatusCode::UNAUTHORIZED,
            SiteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Pairs an error with the short label reported in the `error` field of the
/// JSON body, e.g. `{"error": "Failed to fetch releases", "message": ...}`.
pub struct ApiError {
    pub label: &'static str,
    pub source: SiteError,
}

impl ApiError {
    pub fn new(label: &'static str, source: SiteError) -> Self {
        Self { label, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.source.status();
        let body = match status {
            StatusCode::INTERNAL_SERVER_ERROR => json!({
                "error": self.label,
                "message": self.source.to_string(),
            }),
            _ => json!({ "error": self.source.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
