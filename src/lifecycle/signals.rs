//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT or SIGTERM
//! - Tell the caller which one arrived so it can stop gracefully
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Awaited inside the server task; no extra task is spawned
//! - If a handler cannot be installed, that signal is simply never observed

use std::fmt;

/// A signal that asks the adapter to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::Interrupt => write!(f, "SIGINT"),
            StopSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolve when SIGINT or SIGTERM arrives.
pub async fn stop_signal() -> StopSignal {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => StopSignal::Interrupt,
        _ = terminate => StopSignal::Terminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_display_their_names() {
        assert_eq!(StopSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopSignal::Terminate.to_string(), "SIGTERM");
    }
}
