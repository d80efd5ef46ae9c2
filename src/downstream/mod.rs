//! Downstream (stream processor) subsystem.
//!
//! # Data Flow
//! ```text
//! Ingested metric instances
//!     → forwarder.rs (serialize batch, attempt loop)
//!     → transport.rs (OutboundTransport: HTTP POST)
//!     → classifier.rs (ErrorClassifier: delivered / rejected / transient)
//!     → resilience (backoff before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Transport and classifier are traits injected at server construction
//! - A failed batch is reported to the caller, it never stops the server

pub mod classifier;
pub mod forwarder;
pub mod transport;

pub use classifier::{ErrorClassifier, ForwardError, StreamProcessorClassifier};
pub use forwarder::Forwarder;
pub use transport::{
    HttpTransport, OutboundTransport, TransportError, TransportRequest, TransportResponse,
};
