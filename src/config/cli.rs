use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// In-process response cache keyed by request URL
    Edge,
    /// Redis key-value store
    Redis,
    /// JSON files on local disk
    Fs,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Base URL of the Supabase project serving the catalog
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Anonymous API key for the catalog store
    #[arg(long, env = "SUPABASE_ANON_KEY")]
    pub supabase_key: String,

    /// GitHub repository publishing launcher releases
    #[arg(long, env = "GITHUB_REPO", default_value = "Vadko/littlebit-launcher")]
    pub github_repo: String,

    /// Optional token to raise the GitHub rate limit
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Where release snapshots are cached
    #[arg(long, env = "CACHE_BACKEND", value_enum, default_value_t = CacheBackend::Edge)]
    pub cache_backend: CacheBackend,

    /// Redis connection URL, required for the redis backend
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Directory for the fs cache backend
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Seconds a release snapshot is served without refreshing
    #[arg(long, default_value_t = 3600)]
    pub release_ttl: u64,

    /// Grace window advertised to downstream caches
    #[arg(long, default_value_t = 60)]
    pub stale_while_revalidate: u64,

    /// Seconds an expired snapshot is kept for serving when GitHub fails
    #[arg(long, default_value_t = 86_400)]
    pub stale_retention: u64,

    /// Seconds the team list is kept in memory
    #[arg(long, default_value_t = 600)]
    pub teams_ttl: u64,

    /// Games per catalog page
    #[arg(long, default_value_t = 12)]
    pub page_size: usize,

    /// Shared secret for the revalidation endpoint
    #[arg(long, env = "REVALIDATE_SECRET", hide_env_values = true)]
    pub revalidate_secret: Option<String>,

    /// Public base URL of the image bucket
    #[arg(long, env = "IMAGES_BASE_URL", default_value = "https://images.lblauncher.com")]
    pub images_base_url: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
