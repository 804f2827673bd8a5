//! Fault-injecting store for testing.

use async_trait::async_trait;
use crate::application::ports::{Store, StoreError};
use crate::infrastructure::memory::MemoryStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Store wrapper that injects failures on demand.
///
/// Wraps a [`MemoryStore`] and lets tests toggle failures per operation,
/// fail deletes after a budget of successes, truncate bulk reads, or report
/// a key as holding an uninterpretable value. Seed state through the normal
/// `Store` methods before enabling failures.
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_multi_get: AtomicBool,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
    /// Deletes allowed before failing; `usize::MAX` means unlimited.
    delete_budget: AtomicUsize,
    /// Values returned per bulk read; `usize::MAX` means all of them.
    multi_get_cap: AtomicUsize,
    poisoned_key: Mutex<Option<String>>,
}

impl FailingStore {
    /// Create a store with no failures injected.
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_multi_get: AtomicBool::new(false),
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            delete_budget: AtomicUsize::new(usize::MAX),
            multi_get_cap: AtomicUsize::new(usize::MAX),
            poisoned_key: Mutex::new(None),
        }
    }

    /// Fail all bulk reads.
    pub fn fail_multi_get(&self, fail: bool) {
        self.fail_multi_get.store(fail, Ordering::SeqCst);
    }

    /// Fail all single reads.
    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Fail all writes.
    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Fail all deletes.
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Let `n` delete calls succeed, then fail the rest.
    pub fn fail_deletes_after(&self, n: usize) {
        self.delete_budget.store(n, Ordering::SeqCst);
    }

    /// Return at most `n` values from each bulk read, however many keys
    /// were asked for.
    pub fn truncate_multi_get_to(&self, n: usize) {
        self.multi_get_cap.store(n, Ordering::SeqCst);
    }

    /// Report bulk reads covering `key` as an invalid-value failure.
    pub fn poison(&self, key: &str) {
        *self
            .poisoned_key
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock") =
            Some(key.to_string());
    }

    /// Clear all injected failures.
    pub fn reset(&self) {
        self.fail_multi_get.store(false, Ordering::SeqCst);
        self.fail_get.store(false, Ordering::SeqCst);
        self.fail_set.store(false, Ordering::SeqCst);
        self.fail_delete.store(false, Ordering::SeqCst);
        self.delete_budget.store(usize::MAX, Ordering::SeqCst);
        self.multi_get_cap.store(usize::MAX, Ordering::SeqCst);
        *self
            .poisoned_key
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock") =
            None;
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("injected failure".to_string())
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if self.fail_multi_get.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        if let Some(poisoned) = self
            .poisoned_key
            .lock()
            .expect("FailingStore mutex poisoned - a test thread panicked while holding the lock")
            .as_deref()
        {
            if keys.iter().any(|key| key == poisoned) {
                return Err(StoreError::InvalidValue(poisoned.to_string()));
            }
        }
        let mut values = self.inner.multi_get(keys).await?;
        let cap = self.multi_get_cap.load(Ordering::SeqCst);
        if cap != usize::MAX {
            values.truncate(cap);
        }
        Ok(values)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.get(key).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let budget = self.delete_budget.load(Ordering::SeqCst);
        if budget == 0 {
            return Err(Self::unavailable());
        }
        if budget != usize::MAX {
            self.delete_budget.store(budget - 1, Ordering::SeqCst);
        }
        self.inner.delete(keys).await
    }
}
