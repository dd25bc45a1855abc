use chrono::{DateTime, Utc};

/// Resolves stored image paths against the public image bucket.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
}

impl ImageResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URLs pass through; relative paths are joined to the bucket.
    /// `updated_at` adds a `v=<millis>` cache-buster.
    pub fn url(&self, path: Option<&str>, updated_at: Option<DateTime<Utc>>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;

        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };

        Some(match updated_at {
            Some(updated_at) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{url}{separator}v={}", updated_at.timestamp_millis())
            }
            None => url,
        })
    }
}
