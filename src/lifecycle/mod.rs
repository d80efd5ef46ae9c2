//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse args → Load config → Logger → TLS credentials → Transport
//!     → Construct server → Spawn run loop → Wait
//!
//! Shutdown (shutdown.rs):
//!     Server stops or fails → Report once → Orchestrator wakes → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Graceful server stop → Clean report
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logger, then listener
//! - Exactly one background task; the main path waits on one receive
//! - Graceful stop drains in-flight requests up to a deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{ShutdownReceiver, ShutdownSender};
pub use startup::{
    AdapterFactory, AdapterRunner, AdapterServerFactory, ExitStatus, LifecycleState, Orchestrator,
    Termination,
};
