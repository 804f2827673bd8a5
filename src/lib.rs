//! # slotgate
//!
//! Distributed slot-based concurrency limiting over a pluggable key-value store.
//!
//! This crate bounds how many jobs of a category run at once, across any number
//! of processes, by reserving one of `limit` named slots per active job in a
//! shared store. Slots carry a time-to-live, so jobs that crash or forget to
//! release still free their slot once the TTL elapses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slotgate::{MemoryStore, RateLimiter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let limiter = RateLimiter::new(MemoryStore::new());
//!
//!     // Admit up to three concurrent "deploy" jobs.
//!     let job_id = limiter.add_job("deploy", 3, None, None).await?;
//!
//!     // ... do the work ...
//!
//!     limiter.delete_job("deploy", 3, &job_id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! A category with concurrency bound `limit` owns exactly `limit` slots in
//! the store, keyed `{category}-0` through `{category}-{limit - 1}`. The keys
//! are derived purely from the category name and the bound, so every process
//! that agrees on `(category, limit)` addresses the same slots without any
//! coordination step.
//!
//! - [`RateLimiter::add_job`] bulk-reads all slots, writes the job identifier
//!   into the lowest free one with a TTL, and returns the identifier. When
//!   every slot is occupied it fails with [`LimiterError::NoSlotAvailable`]
//!   immediately; there is no queueing or internal retry.
//! - [`RateLimiter::list_jobs`] returns the ordered [`SlotMap`] of occupants.
//! - [`RateLimiter::delete_job`] deletes every slot holding the identifier.
//!
//! Keep `limit` consistent per category: the bound is part of the slot
//! address space, so shrinking it orphans occupants in slots above the new
//! range and growing it introduces fresh always-free slots.
//!
//! ## Admission Is Not Atomic
//!
//! The store contract offers plain reads, writes with expiry, and deletes;
//! there is no conditional write. Admission is therefore a scan followed by
//! a write, and two concurrent admissions can pick the same free slot: the
//! later write silently overwrites the earlier occupant, transiently
//! exceeding the bound or clobbering an identifier without its owner
//! noticing. Treat `limit` as a strong hint rather than a hard invariant
//! under contention, or serialize admissions per category in the caller.
//!
//! ## TTL As Release
//!
//! Every write carries a positive TTL (explicit per admission, or the
//! limiter's default). Expiry is enforced entirely by the store; the limiter
//! never tracks deadlines and observes an expired slot simply as a free one
//! on the next read. Long-running jobs should either pass a generous TTL or
//! re-admit under the same identifier to refresh it.
//!
//! ## Distributed Deployments
//!
//! Enable the `redis-storage` feature for a Redis-backed store. Slot keys
//! and job identifiers are plain strings with no prefix or encoding, so
//! non-Rust services can participate in the same slot space:
//!
//! ```rust,ignore
//! use slotgate::{RateLimiter, RedisStore};
//!
//! let store = RedisStore::connect("redis://127.0.0.1/").await?;
//! let limiter = RateLimiter::new(store);
//! ```
//!
//! ## Observability
//!
//! Monitor admission behavior with built-in metrics:
//!
//! ```rust,no_run
//! # use slotgate::{MemoryStore, RateLimiter};
//! # let limiter = RateLimiter::new(MemoryStore::new());
//! let metrics = limiter.metrics();
//! println!("Jobs admitted: {}", metrics.jobs_admitted());
//! println!("Admissions rejected: {}", metrics.admissions_rejected());
//!
//! let snapshot = metrics.snapshot();
//! println!("Rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! Operations also emit `tracing` events: admissions and releases at DEBUG,
//! store failures at WARN.
//!
//! ## Feature Flags
//!
//! - `redis-storage`: Redis store adapter (`RedisStore`)
//! - `test-helpers`: controllable test doubles (`MockClock`, `FailingStore`)
//!   for testing code built on this crate

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    job::generate_job_id,
    slots::{slot_keys, Slot, SlotMap},
};

pub use application::{
    limiter::{ConfigError, LimiterError, RateLimiter, DEFAULT_TTL},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Store, StoreError},
};

pub use infrastructure::{clock::SystemClock, memory::MemoryStore};

#[cfg(feature = "redis-storage")]
pub use infrastructure::redis_store::RedisStore;
