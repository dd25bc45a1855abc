use crate::config::{CacheBackend, Config};
use crate::domain::storage::CacheStore;
use crate::error::{Result, SiteError};
use crate::infrastructure::{
    EdgeStore, FileSystemStore, GitHubClient, PageCache, RedisStore, SupabaseClient,
};
use crate::routes::AppState;
use crate::services::{
    CatalogService, ImageResolver, ReleasePolicy, ReleaseService, RevalidationService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod domain;
mod error;
mod infrastructure;
mod routes;
mod services;
#[cfg(test)]
mod test_support;
mod utils;

/// Rendered pages are dropped after this long even without a revalidation.
const PAGE_SAFETY_TTL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.args.log_level));
    fmt().with_env_filter(filter).init();

    info!("Initializing state...");
    let state = Arc::new(build_state(&config)?);
    let app = routes::router(state);

    let address = format!("0.0.0.0:{}", config.args.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn cache_store(config: &Config, retention: Duration) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match config.args.cache_backend {
        CacheBackend::Edge => Arc::new(EdgeStore::new(retention)),
        CacheBackend::Redis => {
            let url = config.args.redis_url.as_deref().ok_or_else(|| {
                SiteError::Other("REDIS_URL must be set for the redis cache backend".to_string())
            })?;
            Arc::new(RedisStore::new(url)?)
        }
        CacheBackend::Fs => Arc::new(FileSystemStore::new(&config.args.cache_dir)),
    };

    info!("Caching releases in the {} store", store.name());
    Ok(store)
}

fn build_state(config: &Config) -> Result<AppState> {
    let args = &config.args;

    let policy = ReleasePolicy {
        ttl: config.release_ttl(),
        stale_while_revalidate: Duration::from_secs(args.stale_while_revalidate),
        stale_retention: config.stale_retention(),
    };
    let store = cache_store(config, policy.ttl + policy.stale_retention)?;

    let catalog = SupabaseClient::new(
        config.http_client.clone(),
        &args.supabase_url,
        args.supabase_key.clone(),
    );
    let github = GitHubClient::new(
        config.http_client.clone(),
        args.github_repo.clone(),
        args.github_token.clone(),
    );
    let pages = Arc::new(PageCache::new(PAGE_SAFETY_TTL));

    Ok(AppState {
        catalog: CatalogService::new(Arc::new(catalog), config.teams_ttl()),
        releases: ReleaseService::new(Arc::new(github), store, policy),
        revalidation: RevalidationService::new(args.revalidate_secret.clone(), pages.clone()),
        pages,
        images: ImageResolver::new(&args.images_base_url),
        page_size: args.page_size,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
