//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events through the Logger handle)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (compact or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Logger is created once and flushed on every exit path
//! - Request ID flows through request spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{Logger, LoggerGuard, LoggerProvider, LoggingError, TracingLoggerProvider};
