//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! GRPC_ADAPTER_CREDENTIAL / _PRIVATE_KEY / _CERTIFICATE
//!     → credentials.rs (read once at startup, no validation)
//!     → TlsMaterial (moved into the adapter server)
//!     → net::tls (PEM loading, client certificate verification)
//! ```
//!
//! # Design Decisions
//! - All three variables unset means plain text; this is not an error
//! - Partially set material is rejected when the server is built

pub mod credentials;

pub use credentials::{resolve_tls_material, TlsMaterial};
