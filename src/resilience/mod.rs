//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Admin API call made by a handler:
//!     → upstream client enforces the per-call timeout
//!     → On unavailability: retries.rs (retry with backoff.rs delays)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every admin API call has a deadline
//! - Retries only for idempotent reads
//! - Decode errors are never retried (the same body would come back)

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
