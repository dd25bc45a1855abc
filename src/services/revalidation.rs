use crate::domain::storage::PageInvalidator;
use crate::error::{Result, SiteError};
use crate::utils::team_slug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const LIST_PATH: &str = "/games";

#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Revalidated {
    pub revalidated: bool,
    pub paths: Vec<String>,
}

/// Marks catalog pages stale after the catalog changed upstream.
pub struct RevalidationService {
    secret: Option<String>,
    pages: Arc<dyn PageInvalidator>,
}

impl RevalidationService {
    pub fn new(secret: Option<String>, pages: Arc<dyn PageInvalidator + 'static>) -> Self {
        if secret.is_none() {
            warn!("No revalidation secret configured, every revalidation will be rejected");
        }
        Self { secret, pages }
    }

    /// Without a configured secret nothing is authorized.
    pub fn authorize(&self, provided: Option<&str>) -> Result<()> {
        match (&self.secret, provided) {
            (Some(expected), Some(provided)) if expected == provided => Ok(()),
            _ => Err(SiteError::Unauthorized),
        }
    }

    pub fn paths_for(slug: &str, team: Option<&str>) -> Vec<String> {
        let team = team.map(team_slug).filter(|t| !t.is_empty());

        let mut paths = Vec::with_capacity(3);
        if let Some(team) = team {
            paths.push(format!("{LIST_PATH}/{slug}/{team}"));
        }
        paths.push(format!("{LIST_PATH}/{slug}"));
        paths.push(LIST_PATH.to_string());
        paths
    }

    pub async fn revalidate(
        &self,
        provided_secret: Option<&str>,
        request: RevalidateRequest,
    ) -> Result<Revalidated> {
        self.authorize(provided_secret)?;

        let slug = request
            .slug
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SiteError::BadRequest("slug is required".to_string()))?;

        let paths = Self::paths_for(&slug, request.team.as_deref());
        for path in &paths {
            self.pages.invalidate(path).await;
        }

        info!("Revalidated {} pages for {slug}", paths.len());
        Ok(Revalidated {
            revalidated: true,
            paths,
        })
    }
}
