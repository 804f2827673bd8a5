//! Domain layer - pure slot-space logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the limiter:
//! - Slot key derivation from a category name and a concurrency limit
//! - The ordered slot map a bulk read produces
//! - Job identifier generation
//!
//! All types in this layer are pure and easily testable.

pub mod job;
pub mod slots;
