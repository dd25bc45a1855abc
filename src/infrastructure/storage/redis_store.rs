//! # Redis
//!
//! Durable key-value backend for release snapshots. One string key holding
//! the serialized snapshot, expired by Redis itself via `SET .. EX`.
//!
//! The connection is opened on first use so an unreachable Redis never
//! blocks start-up; every failure surfaces as an error that the release
//! cache treats as a miss.
use crate::domain::storage::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("Connected to Redis");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection().await?;
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut connection = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        let _: () = connection.set_ex(key, value, seconds).await?;
        Ok(())
    }
}
