//! Redis-backed store implementation.
//!
//! Provides a distributed store backend using Redis, allowing slot
//! occupancy to be shared across multiple application instances.
//!
//! ## Architecture
//!
//! The Redis store uses a plain key-value model:
//! - Keys: slot keys exactly as the limiter derives them, no prefix
//! - Values: job identifier strings
//! - TTL: per-write expiry, enforced entirely by Redis
//!
//! Because keys and values are plain strings, processes written in other
//! languages can participate in the same slot space as long as they derive
//! the same keys.
//!
//! ## Features
//!
//! - Automatic expiration (TTL) releases slots of jobs that never finish
//! - Connection pooling via `redis::aio::ConnectionManager`
//! - Async-only interface (requires `tokio` runtime)
//!
//! ## Example
//!
//! ```rust,ignore
//! use slotgate::{RateLimiter, RedisStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = RedisStore::connect("redis://127.0.0.1/")
//!         .await
//!         .expect("Failed to connect to Redis");
//!
//!     let limiter = RateLimiter::new(store);
//!     let job_id = limiter.add_job("deploy", 3, None, None).await.unwrap();
//! }
//! ```

use async_trait::async_trait;
use crate::application::ports::{Store, StoreError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Redis-backed store for distributed concurrency limiting.
///
/// This store implementation allows multiple application instances to
/// share slot occupancy via Redis.
pub struct RedisStore {
    connection: Arc<RwLock<ConnectionManager>>,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl Clone for RedisStore {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
        }
    }
}

impl RedisStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
    ///
    /// # Errors
    /// Returns error if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection: Arc::new(RwLock::new(connection)),
        })
    }

    /// EX takes whole seconds; round sub-second TTLs up so they persist.
    fn ttl_secs(ttl: Duration) -> u64 {
        let mut secs = ttl.as_secs();
        if ttl.subsec_nanos() > 0 {
            secs += 1;
        }
        secs
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        // MGET with no keys is a protocol error.
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection.write().await;
        let values: Vec<Value> = conn.mget(keys).await?;

        keys.iter()
            .zip(values)
            .map(|(key, value)| match value {
                Value::Nil => Ok(None),
                other => redis::from_redis_value::<String>(&other)
                    .map(Some)
                    .map_err(|_| StoreError::InvalidValue(key.clone())),
            })
            .collect()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.write().await;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection.write().await;
        conn.set_ex::<_, _, ()>(key, value, Self::ttl_secs(ttl))
            .await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        // DEL with no keys is a protocol error.
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection.write().await;
        conn.del::<_, ()>(keys).await?;
        Ok(())
    }
}
