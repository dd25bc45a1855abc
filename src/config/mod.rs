use crate::config::cli::Args;
use crate::error::{Result, SiteError};
use clap::Parser;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

pub use cli::CacheBackend;

pub struct Config {
    pub args: Args,
    pub http_client: Client,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        if args.cache_backend == CacheBackend::Redis && args.redis_url.is_none() {
            return Err(SiteError::Other(
                "REDIS_URL must be set for the redis cache backend".to_string(),
            ));
        }

        if args.page_size == 0 {
            return Err(SiteError::Other("page size must be positive".to_string()));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("lbcatalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            "Configured cache backend {:?}, release ttl {}s",
            args.cache_backend, args.release_ttl
        );

        Ok(Self { args, http_client })
    }

    pub fn release_ttl(&self) -> Duration {
        Duration::from_secs(self.args.release_ttl)
    }

    pub fn stale_retention(&self) -> Duration {
        Duration::from_secs(self.args.stale_retention)
    }

    pub fn teams_ttl(&self) -> Duration {
        Duration::from_secs(self.args.teams_ttl)
    }
}
