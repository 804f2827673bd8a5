//! Observability metrics for slot admission.
//!
//! Provides metrics about limiter behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking limiter statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Metrics are collected throughout admission and release and can be
/// queried at any time for observability.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Total number of jobs admitted into a slot
    jobs_admitted: AtomicU64,
    /// Total number of admissions rejected for lack of a free slot
    admissions_rejected: AtomicU64,
    /// Total number of slots explicitly released
    slots_released: AtomicU64,
    /// Total number of store failures observed
    store_errors: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                jobs_admitted: AtomicU64::new(0),
                admissions_rejected: AtomicU64::new(0),
                slots_released: AtomicU64::new(0),
                store_errors: AtomicU64::new(0),
            }),
        }
    }

    /// Record an admission.
    pub(crate) fn record_admitted(&self) {
        self.inner.jobs_admitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected admission.
    pub(crate) fn record_rejected(&self) {
        self.inner
            .admissions_rejected
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a released slot.
    pub(crate) fn record_released(&self) {
        self.inner.slots_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a store failure.
    pub(crate) fn record_store_error(&self) {
        self.inner.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of jobs admitted.
    pub fn jobs_admitted(&self) -> u64 {
        self.inner.jobs_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of admissions rejected.
    pub fn admissions_rejected(&self) -> u64 {
        self.inner.admissions_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of slots explicitly released.
    pub fn slots_released(&self) -> u64 {
        self.inner.slots_released.load(Ordering::Relaxed)
    }

    /// Get the total number of store failures observed.
    pub fn store_errors(&self) -> u64 {
        self.inner.store_errors.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_admitted: self.jobs_admitted(),
            admissions_rejected: self.admissions_rejected(),
            slots_released: self.slots_released(),
            store_errors: self.store_errors(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.jobs_admitted.store(0, Ordering::Relaxed);
        self.inner.admissions_rejected.store(0, Ordering::Relaxed);
        self.inner.slots_released.store(0, Ordering::Relaxed);
        self.inner.store_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of jobs admitted into a slot
    pub jobs_admitted: u64,
    /// Total number of admissions rejected for lack of a free slot
    pub admissions_rejected: u64,
    /// Total number of slots explicitly released
    pub slots_released: u64,
    /// Total number of store failures observed
    pub store_errors: u64,
}

impl MetricsSnapshot {
    /// Calculate the rejection rate (0.0 to 1.0).
    ///
    /// Returns the ratio of rejected admissions to total admission attempts.
    /// Returns 0.0 if no admissions have been attempted.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.jobs_admitted.saturating_add(self.admissions_rejected);
        if total == 0 {
            0.0
        } else {
            self.admissions_rejected as f64 / total as f64
        }
    }

    /// Get the total number of admission attempts (admitted + rejected).
    pub fn total_admissions(&self) -> u64 {
        self.jobs_admitted.saturating_add(self.admissions_rejected)
    }
}
