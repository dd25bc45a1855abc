use crate::domain::storage::{CatalogStore, StorageKeys, ViewPage, ViewQuery};
use crate::domain::GameRow;
use crate::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    team: Option<String>,
}

/// Catalog store backed by the Supabase PostgREST endpoint.
pub struct SupabaseClient {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(client: Client, project_url: &str, api_key: String) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("catalog store returned {status}"));

        error!("Catalog store error: Status {status}: {message}");
        Err(SiteError::Store(message))
    }
}

/// PostgREST query parameters for a view request, in a stable order.
pub(crate) fn view_params(query: &ViewQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];

    if !query.head {
        params.push(("order", "name.asc".to_string()));
    }
    if let Some(text) = &query.name_contains {
        params.push(("name", format!("ilike.*{text}*")));
    }
    if let Some(slug) = &query.slug {
        params.push(("slug", format!("eq.{slug}")));
    }
    if let Some(range) = query.range {
        params.push(("offset", range.offset.to_string()));
        params.push(("limit", range.limit.to_string()));
    }

    params
}

/// Total from a `Content-Range` header such as `0-11/345` or `*/0`.
pub(crate) fn parse_content_range(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.parse().ok()
}

#[async_trait]
impl CatalogStore for SupabaseClient {
    async fn query_view(&self, query: &ViewQuery) -> Result<ViewPage> {
        let url = format!("{}/{}", self.rest_url, StorageKeys::GAMES_VIEW);
        let builder = if query.head {
            self.client.head(&url)
        } else {
            self.client.get(&url)
        };

        let mut builder = self.authorized(builder).query(&view_params(query));
        if query.exact_count {
            builder = builder.header("Prefer", "count=exact");
        }

        let response = Self::check(builder.send().await?).await?;

        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let rows: Vec<GameRow> = if query.head {
            Vec::new()
        } else {
            response.json().await?
        };

        debug!("Catalog view returned {} rows (count {:?})", rows.len(), count);

        Ok(ViewPage { rows, count })
    }

    async fn approved_teams(&self) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.rest_url, StorageKeys::GAMES_TABLE);
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("select", "team"), ("approved", "eq.true")])
            .send()
            .await?;

        let rows: Vec<TeamRow> = Self::check(response).await?.json().await?;

        Ok(rows.into_iter().filter_map(|row| row.team).collect())
    }
}
