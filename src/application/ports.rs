//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error surfaced by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    Unavailable(String),
    /// The store returned a value of an unexpected shape for this key
    InvalidValue(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(message) => {
                write!(f, "store unavailable: {}", message)
            }
            StoreError::InvalidValue(key) => {
                write!(f, "store returned an invalid value for key '{}'", key)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Port for the shared key-value store.
///
/// This abstraction allows the application layer to read and write slots
/// without depending on a specific backend. Infrastructure provides concrete
/// implementations (MemoryStore, RedisStore).
///
/// The limiter relies on exactly four capabilities: bulk read, single read,
/// write with expiry, and delete. Adapters must not promise more; in
/// particular there is no conditional write, so the limiter's concurrency
/// behavior is defined entirely in terms of this contract.
///
/// Expiry is the store's job: once a value's time-to-live elapses, reads
/// must report the key as absent. The application layer never tracks
/// deadlines itself.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    /// Read many keys at once.
    ///
    /// # Arguments
    /// * `keys` - The keys to read, in the order values must be returned
    ///
    /// # Returns
    /// One entry per key, positionally aligned with `keys`. `None` marks a
    /// key that holds no live value.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Read a single key.
    ///
    /// # Returns
    /// The live value under `key`, or `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key` with a time-to-live.
    ///
    /// Overwrites any existing value and restarts the expiry timer.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
        -> Result<(), StoreError>;

    /// Delete one or more keys.
    ///
    /// Deleting absent keys is not an error, and an empty slice is a no-op.
    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        (**self).multi_get(keys).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        (**self).set_with_ttl(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        (**self).delete(keys).await
    }
}

/// Port for obtaining current time.
///
/// This abstraction allows store adapters that track expiry locally to work
/// with time without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}
