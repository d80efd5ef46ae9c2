//! Telemetry adapter library.
//!
//! Receives metric instances from a service mesh over plain or mutual TLS
//! and forwards them to a stream processor's HTTP receiver.

pub mod config;
pub mod downstream;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::AdapterConfig;
pub use http::{AdapterError, AdapterParts, AdapterServer};
pub use lifecycle::{AdapterServerFactory, Orchestrator, Termination};
