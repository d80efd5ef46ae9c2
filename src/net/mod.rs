//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Listen address
//!     → listener.rs (normalise, bind, non-blocking)
//!     → tls.rs (optional mutual TLS: server cert + client CA)
//!     → Hand off to the adapter server
//! ```
//!
//! # Design Decisions
//! - Binding happens at construction, so a busy port is a startup error
//! - TLS is optional; when on, every client must present a certificate

pub mod listener;
pub mod tls;

pub use listener::{normalize_address, BoundListener, ListenerError};
pub use tls::{build_mtls_config, TlsError};
