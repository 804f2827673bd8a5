//! Slot admission and release logic.
//!
//! The limiter decides whether jobs may start by claiming one of a fixed set
//! of named slots in the shared store, and frees those slots when jobs
//! finish or their time-to-live elapses.

use crate::application::metrics::Metrics;
use crate::application::ports::{Store, StoreError};
use crate::domain::job::effective_job_id;
use crate::domain::slots::{slot_keys, SlotMap};
use std::time::Duration;

/// Time-to-live applied to admissions that do not specify one (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Error validating limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Default time-to-live must be greater than zero
    ZeroDefaultTtl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroDefaultTtl => {
                write!(f, "default TTL must be greater than 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error from a limiter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimiterError {
    /// Every slot of the category was occupied at scan time
    NoSlotAvailable,
    /// The underlying store failed
    Store(StoreError),
}

impl std::fmt::Display for LimiterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimiterError::NoSlotAvailable => {
                write!(f, "no slot available: all slots are occupied")
            }
            LimiterError::Store(e) => {
                write!(f, "store operation failed: {}", e)
            }
        }
    }
}

impl std::error::Error for LimiterError {}

impl From<StoreError> for LimiterError {
    fn from(e: StoreError) -> Self {
        LimiterError::Store(e)
    }
}

/// Coordinates slot admission and release against a shared store.
///
/// Every admission claims one of `limit` named slots for its category and
/// records the job identifier there with a time-to-live. Any process that
/// talks to the same store and uses the same `(job_category, limit)` pair
/// participates in the same bound; the limiter itself keeps no local state
/// beyond a metrics counter.
///
/// # Example
/// ```
/// use slotgate::{MemoryStore, RateLimiter};
///
/// # async fn demo() -> Result<(), slotgate::LimiterError> {
/// let limiter = RateLimiter::new(MemoryStore::new());
///
/// let job_id = limiter.add_job("deploy", 3, None, None).await?;
/// let slots = limiter.list_jobs("deploy", 3).await?;
/// assert_eq!(slots.occupant("deploy-0"), Some(job_id.as_str()));
///
/// limiter.delete_job("deploy", 3, &job_id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter<S>
where
    S: Store,
{
    store: S,
    default_ttl: Duration,
    metrics: Metrics,
}

impl<S> RateLimiter<S>
where
    S: Store,
{
    /// Create a limiter over `store` with the default time-to-live
    /// ([`DEFAULT_TTL`]) for admissions that do not specify one.
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_ttl: DEFAULT_TTL,
            metrics: Metrics::new(),
        }
    }

    /// Create a limiter with a custom default time-to-live.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroDefaultTtl` if `default_ttl` is zero; a
    /// zero TTL would never persist an admission.
    pub fn with_default_ttl(store: S, default_ttl: Duration) -> Result<Self, ConfigError> {
        if default_ttl.is_zero() {
            return Err(ConfigError::ZeroDefaultTtl);
        }
        Ok(Self {
            store,
            default_ttl,
            metrics: Metrics::new(),
        })
    }

    /// The time-to-live applied when an admission does not supply one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Enumerate the slots of a category and their current occupants.
    ///
    /// Derives the `limit` slot keys, issues one bulk read for all of them,
    /// and zips the returned values positionally back onto the keys.
    ///
    /// # Arguments
    /// * `job_category` - The category whose slots to read
    /// * `limit` - The category's concurrency bound
    ///
    /// # Returns
    /// The category's slots in ordinal order. `limit = 0` yields an empty
    /// map without touching the store.
    ///
    /// # Errors
    /// Any store failure aborts the read and is returned unchanged; nothing
    /// is retried.
    pub async fn list_jobs(
        &self,
        job_category: &str,
        limit: usize,
    ) -> Result<SlotMap, LimiterError> {
        let keys = slot_keys(job_category, limit);
        if keys.is_empty() {
            return Ok(SlotMap::default());
        }

        let occupants = match self.store.multi_get(&keys).await {
            Ok(occupants) => occupants,
            Err(e) => {
                self.metrics.record_store_error();
                tracing::warn!(
                    error = %e,
                    job_category = %job_category,
                    "Bulk slot read failed"
                );
                return Err(e.into());
            }
        };

        if occupants.len() != keys.len() {
            self.metrics.record_store_error();
            let e = StoreError::Unavailable(format!(
                "bulk read returned {} values for {} keys",
                occupants.len(),
                keys.len()
            ));
            tracing::warn!(
                error = %e,
                job_category = %job_category,
                "Bulk slot read misaligned"
            );
            return Err(e.into());
        }

        Ok(SlotMap::zip(keys, occupants))
    }

    /// Admit a job into the first free slot of its category.
    ///
    /// Scans the category's slots in ordinal order and writes the job
    /// identifier into the lowest free one, bounded by `ttl`.
    ///
    /// # Arguments
    /// * `job_category` - The category the job belongs to
    /// * `limit` - The category's concurrency bound
    /// * `job_id` - Identifier to admit under; a fresh one is generated when
    ///   `None` or empty
    /// * `ttl` - Occupancy time-to-live; the configured default applies when
    ///   `None` or zero
    ///
    /// # Returns
    /// The identifier the job was admitted under.
    ///
    /// # Errors
    /// Returns `LimiterError::NoSlotAvailable` when every slot is occupied
    /// (nothing is written), or `LimiterError::Store` when the scan or the
    /// write fails.
    ///
    /// # Concurrency
    /// Admission is not atomic: the scan and the write are two separate
    /// store round-trips with no conditional write between them. Two
    /// concurrent admissions can pick the same free slot, in which case the
    /// later write silently overwrites the earlier occupant and the bound
    /// can be transiently exceeded. Callers that need a strict bound must
    /// serialize admissions per category themselves.
    pub async fn add_job(
        &self,
        job_category: &str,
        limit: usize,
        job_id: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<String, LimiterError> {
        let slots = self.list_jobs(job_category, limit).await?;

        let slot_key = match slots.first_free() {
            Some(slot) => slot.key().to_owned(),
            None => {
                self.metrics.record_rejected();
                tracing::debug!(
                    job_category = %job_category,
                    limit = limit,
                    "No free slot, admission rejected"
                );
                return Err(LimiterError::NoSlotAvailable);
            }
        };

        let job_id = effective_job_id(job_id);
        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.default_ttl,
        };

        if let Err(e) = self.store.set_with_ttl(&slot_key, &job_id, ttl).await {
            self.metrics.record_store_error();
            tracing::warn!(
                error = %e,
                slot = %slot_key,
                "Failed to write slot occupancy"
            );
            return Err(e.into());
        }

        self.metrics.record_admitted();
        tracing::debug!(
            job_category = %job_category,
            slot = %slot_key,
            job_id = %job_id,
            ttl_secs = ttl.as_secs(),
            "Job admitted"
        );
        Ok(job_id)
    }

    /// Release every slot of a category held by `job_id`.
    ///
    /// Normally a job holds one slot, but concurrent admissions can leave
    /// the same identifier in several; all matching slots are deleted, in
    /// ordinal order.
    ///
    /// # Arguments
    /// * `job_category` - The category the job belongs to
    /// * `limit` - The category's concurrency bound
    /// * `job_id` - The identifier returned by [`add_job`](Self::add_job)
    ///
    /// # Errors
    /// Any store failure aborts the remaining deletes and is returned; slots
    /// deleted before the failure stay deleted. Releasing an identifier that
    /// holds no slot is a no-op success, so release is idempotent.
    pub async fn delete_job(
        &self,
        job_category: &str,
        limit: usize,
        job_id: &str,
    ) -> Result<(), LimiterError> {
        let slots = self.list_jobs(job_category, limit).await?;

        // One delete per slot, so a failure leaves earlier releases applied.
        for slot in slots.slots_held_by(job_id) {
            let key = [slot.key().to_owned()];
            if let Err(e) = self.store.delete(&key).await {
                self.metrics.record_store_error();
                tracing::warn!(
                    error = %e,
                    slot = %slot.key(),
                    job_id = %job_id,
                    "Failed to delete slot, aborting release"
                );
                return Err(e.into());
            }
            self.metrics.record_released();
            tracing::debug!(slot = %slot.key(), job_id = %job_id, "Slot released");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::mocks::{FailingStore, MockClock};
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn test_add_job_takes_lowest_free_slot() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter.add_job("encode", 3, None, None).await.unwrap();

        let slots = limiter.list_jobs("encode", 3).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some(id.as_str()));
        assert_eq!(slots.occupant("encode-1"), None);
        assert_eq!(slots.occupant("encode-2"), None);
    }

    #[tokio::test]
    async fn test_add_job_honors_supplied_id() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter
            .add_job("encode", 2, Some("job-7"), None)
            .await
            .unwrap();

        assert_eq!(id, "job-7");
        let slots = limiter.list_jobs("encode", 2).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some("job-7"));
    }

    #[tokio::test]
    async fn test_add_job_generates_id_when_missing_or_empty() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let generated = limiter.add_job("encode", 2, None, None).await.unwrap();
        let replaced = limiter.add_job("encode", 2, Some(""), None).await.unwrap();

        assert!(!generated.is_empty());
        assert!(!replaced.is_empty());
        assert_ne!(generated, replaced);
    }

    #[tokio::test]
    async fn test_add_job_rejects_when_full() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter.add_job("encode", 1, None, None).await.unwrap();
        let err = limiter.add_job("encode", 1, None, None).await.unwrap_err();

        assert_eq!(err, LimiterError::NoSlotAvailable);

        // The existing occupant is untouched.
        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_zero_limit_rejects_without_store_round_trip() {
        let store = FailingStore::new();
        store.fail_multi_get(true);
        let limiter = RateLimiter::new(store);

        let err = limiter.add_job("encode", 0, None, None).await.unwrap_err();

        assert_eq!(err, LimiterError::NoSlotAvailable);
    }

    #[tokio::test]
    async fn test_admission_reuses_freed_low_ordinal() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let first = limiter.add_job("encode", 3, None, None).await.unwrap();
        let _second = limiter.add_job("encode", 3, None, None).await.unwrap();
        limiter.delete_job("encode", 3, &first).await.unwrap();

        let third = limiter.add_job("encode", 3, None, None).await.unwrap();

        let slots = limiter.list_jobs("encode", 3).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some(third.as_str()));
    }

    #[tokio::test]
    async fn test_empty_stored_value_is_a_free_slot() {
        let store = Arc::new(MemoryStore::new());

        // Another participant may persist "" for a free slot instead of
        // deleting the key.
        store
            .set_with_ttl("encode-0", "", Duration::from_secs(60))
            .await
            .unwrap();

        let limiter = RateLimiter::new(store);

        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert!(slots.get("encode-0").unwrap().is_free());
        assert_eq!(slots.occupant("encode-0"), None);

        let id = limiter.add_job("encode", 1, None, None).await.unwrap();
        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_list_jobs_empty_store_shows_all_free() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let slots = limiter.list_jobs("encode", 4).await.unwrap();

        assert_eq!(slots.len(), 4);
        assert_eq!(slots.free_count(), 4);
    }

    #[tokio::test]
    async fn test_list_jobs_zero_limit_is_empty() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let slots = limiter.list_jobs("encode", 0).await.unwrap();

        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_delete_job_removes_all_matching_slots() {
        let store = Arc::new(MemoryStore::new());

        // Seed the same identifier into two slots, as a lost admission race
        // would.
        store
            .set_with_ttl("encode-0", "job-a", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_with_ttl("encode-2", "job-a", Duration::from_secs(60))
            .await
            .unwrap();

        let limiter = RateLimiter::new(store);
        limiter.delete_job("encode", 3, "job-a").await.unwrap();

        let slots = limiter.list_jobs("encode", 3).await.unwrap();
        assert_eq!(slots.free_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_job_is_idempotent() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter.add_job("encode", 2, None, None).await.unwrap();
        limiter.delete_job("encode", 2, &id).await.unwrap();
        limiter.delete_job("encode", 2, &id).await.unwrap();

        let slots = limiter.list_jobs("encode", 2).await.unwrap();
        assert_eq!(slots.free_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_job_unknown_id_is_noop() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter.add_job("encode", 2, None, None).await.unwrap();
        limiter.delete_job("encode", 2, "job-nobody").await.unwrap();

        let slots = limiter.list_jobs("encode", 2).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_delete_job_aborts_on_store_failure() {
        let store = Arc::new(FailingStore::new());
        store
            .set_with_ttl("encode-0", "job-a", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_with_ttl("encode-1", "job-a", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_with_ttl("encode-2", "job-a", Duration::from_secs(60))
            .await
            .unwrap();
        store.fail_deletes_after(1);

        let limiter = RateLimiter::new(store.clone());
        let err = limiter.delete_job("encode", 3, "job-a").await.unwrap_err();
        assert!(matches!(err, LimiterError::Store(_)));

        // The delete that succeeded is not rolled back; the rest remain.
        store.reset();
        let slots = limiter.list_jobs("encode", 3).await.unwrap();
        assert_eq!(slots.occupant("encode-0"), None);
        assert_eq!(slots.occupant("encode-1"), Some("job-a"));
        assert_eq!(slots.occupant("encode-2"), Some("job-a"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates_from_list() {
        let store = FailingStore::new();
        store.fail_multi_get(true);
        let limiter = RateLimiter::new(store);

        let err = limiter.list_jobs("encode", 2).await.unwrap_err();

        assert!(matches!(err, LimiterError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_misaligned_bulk_read_is_a_store_error() {
        let store = FailingStore::new();
        store.truncate_multi_get_to(1);
        let limiter = RateLimiter::new(store);

        let err = limiter.list_jobs("encode", 3).await.unwrap_err();

        assert!(matches!(err, LimiterError::Store(StoreError::Unavailable(_))));
        assert_eq!(limiter.metrics().store_errors(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_from_write() {
        let store = FailingStore::new();
        store.fail_set(true);
        let limiter = RateLimiter::new(store);

        let err = limiter.add_job("encode", 2, None, None).await.unwrap_err();

        assert!(matches!(err, LimiterError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_value_is_distinguished() {
        let store = FailingStore::new();
        store.poison("encode-1");
        let limiter = RateLimiter::new(store);

        let err = limiter.list_jobs("encode", 3).await.unwrap_err();

        assert_eq!(
            err,
            LimiterError::Store(StoreError::InvalidValue("encode-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_expired_occupancy_frees_slot() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = RateLimiter::new(MemoryStore::with_clock(clock.clone()));

        limiter
            .add_job("encode", 1, None, Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(
            limiter.add_job("encode", 1, None, None).await.unwrap_err(),
            LimiterError::NoSlotAvailable
        );

        clock.advance(Duration::from_secs(31));

        // Expiry is the store's release; no delete was issued.
        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert_eq!(slots.free_count(), 1);
        limiter.add_job("encode", 1, None, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_ttl_falls_back_to_default() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let store = MemoryStore::with_clock(clock.clone());
        let limiter = RateLimiter::with_default_ttl(store, Duration::from_secs(60)).unwrap();

        limiter
            .add_job("encode", 1, None, Some(Duration::ZERO))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(59));
        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert_eq!(slots.occupied_count(), 1);

        clock.advance(Duration::from_secs(2));
        let slots = limiter.list_jobs("encode", 1).await.unwrap();
        assert_eq!(slots.occupied_count(), 0);
    }

    #[test]
    fn test_zero_default_ttl_rejected() {
        let result = RateLimiter::with_default_ttl(MemoryStore::new(), Duration::ZERO);

        assert_eq!(result.unwrap_err(), ConfigError::ZeroDefaultTtl);
    }

    #[tokio::test]
    async fn test_metrics_track_operations() {
        let limiter = RateLimiter::new(MemoryStore::new());

        let id = limiter.add_job("encode", 1, None, None).await.unwrap();
        let _ = limiter.add_job("encode", 1, None, None).await.unwrap_err();
        limiter.delete_job("encode", 1, &id).await.unwrap();

        let snapshot = limiter.metrics().snapshot();
        assert_eq!(snapshot.jobs_admitted, 1);
        assert_eq!(snapshot.admissions_rejected, 1);
        assert_eq!(snapshot.slots_released, 1);
        assert_eq!(snapshot.store_errors, 0);
    }

    #[tokio::test]
    async fn test_metrics_track_store_errors() {
        let store = FailingStore::new();
        store.fail_multi_get(true);
        let limiter = RateLimiter::new(store);

        let _ = limiter.list_jobs("encode", 2).await;

        assert_eq!(limiter.metrics().store_errors(), 1);
    }
}
