//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Batch to stream processor:
//!     → downstream::transport (request with timeout)
//!     → downstream::classifier (is the failure retryable?)
//!     → retries.rs (attempt budget, delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Every downstream call has a deadline (transport timeout)
//! - Retries are bounded per batch; no retry storms across batches

pub mod retries;

pub use retries::RetryPolicy;
