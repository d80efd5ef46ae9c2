//! Adapter server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (plain or mutual TLS)
//!     → server.rs (Axum setup, middleware, run loop)
//!     → request.rs (telemetry report payload)
//!     → handlers.rs (ingest, health)
//!     → [downstream forwarder]
//!     → response.rs (status mapping)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MetricInstance, TelemetryReport, X_REQUEST_ID};
pub use response::{ErrorBody, IngestResponse};
pub use server::{AdapterError, AdapterParts, AdapterServer, StopHandle};
