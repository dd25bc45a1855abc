use crate::domain::storage::ReleaseSource;
use crate::domain::Release;
use crate::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use tracing::{error, info};

const GITHUB_API: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

pub struct GitHubClient {
    client: Client,
    repo: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: Client, repo: String, token: Option<String>) -> Self {
        Self {
            client,
            repo,
            token,
        }
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let url = format!("{GITHUB_API}/repos/{}/{path}", self.repo);
        let builder = self.client.get(url).header(ACCEPT, GITHUB_ACCEPT);

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn latest_release(&self) -> Result<Release> {
        let response = self.request("releases/latest").send().await?;

        if !response.status().is_success() {
            error!("GitHub API error: Status {}", response.status());
            return Err(SiteError::Upstream(format!(
                "Failed to fetch latest release: {}",
                response.status()
            )));
        }

        let latest: Release = response.json().await?;
        info!("Latest launcher release is {}", latest.tag_name);
        Ok(latest)
    }

    async fn recent_releases(&self, per_page: u32) -> Result<Vec<Release>> {
        let response = self
            .request("releases")
            .query(&[("per_page", per_page)])
            .send()
            .await?;

        if !response.status().is_success() {
            error!("GitHub API releases error: Status {}", response.status());
            return Err(SiteError::Upstream(format!(
                "Failed to fetch releases: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
