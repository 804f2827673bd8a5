//! In-memory store implementation.
//!
//! Provides a concurrent map-backed store for single-process deployments
//! and tests. Expiry is enforced lazily on read against an injected clock.

use async_trait::async_trait;
use crate::application::ports::{Clock, Store, StoreError};
use crate::infrastructure::clock::SystemClock;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Thread-safe in-memory store backed by DashMap.
///
/// DashMap provides lock-free reads and fine-grained locking for writes,
/// so many limiters (or clones of one) can share a single instance behind
/// an `Arc` without contention.
///
/// Honors the store contract's expiry rule without a background sweeper:
/// a read that finds an entry past its deadline removes it and reports the
/// key as absent.
///
/// # Example
/// ```
/// use slotgate::MemoryStore;
/// use slotgate::application::ports::Store;
/// use std::time::Duration;
///
/// # async fn demo() -> Result<(), slotgate::StoreError> {
/// let store = MemoryStore::new();
/// store.set_with_ttl("deploy-0", "job-a", Duration::from_secs(60)).await?;
/// assert_eq!(store.get("deploy-0").await?.as_deref(), Some("job-a"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store using the system clock for expiry.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create an empty store with an injected clock.
    ///
    /// Tests pass a `MockClock` here to drive expiry deterministically.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Get the number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Check if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.is_live(now) {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            // Re-check under the shard lock; a concurrent write may have
            // refreshed the key since the read guard was dropped.
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        None
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        Ok(keys.iter().map(|key| self.live_value(key)).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.live_value(key))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_owned(),
            expires_at: self.clock.now() + ttl,
        };
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }
}
