//! TCP listener binding.
//!
//! # Responsibilities
//! - Normalise the listen address (`host:port`, `:port`, bare port)
//! - Bind synchronously so a bad address or busy port fails construction
//! - Prepare the socket for hand-off to the async runtime

use std::net::{SocketAddr, TcpListener};

use thiserror::Error;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// Failed to configure the bound socket.
    #[error("failed to configure listener on {address}: {source}")]
    Configure {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Turn a bare port (`38355`) or Go-style `:38355` into an all-interfaces
/// address. Anything else is returned unchanged.
pub fn normalize_address(address: &str) -> String {
    let port = address.strip_prefix(':').unwrap_or(address);
    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        format!("0.0.0.0:{}", port)
    } else {
        address.to_string()
    }
}

/// A bound, non-blocking TCP listener ready for the async server.
#[derive(Debug)]
pub struct BoundListener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Bind to `address`. Host names are resolved here.
    pub fn bind(address: &str) -> Result<Self, ListenerError> {
        let normalized = normalize_address(address);
        let inner = TcpListener::bind(normalized.as_str()).map_err(|source| ListenerError::Bind {
            address: address.to_string(),
            source,
        })?;

        let configure = |source| ListenerError::Configure {
            address: address.to_string(),
            source,
        };
        inner.set_nonblocking(true).map_err(configure)?;
        let local_addr = inner.local_addr().map_err(configure)?;

        tracing::info!(
            requested = %address,
            address = %local_addr,
            "Listener bound"
        );

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_std(self) -> TcpListener {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_port_binds_all_interfaces() {
        assert_eq!(normalize_address("38355"), "0.0.0.0:38355");
        assert_eq!(normalize_address(":9999"), "0.0.0.0:9999");
    }

    #[test]
    fn host_port_is_untouched() {
        assert_eq!(normalize_address("127.0.0.1:8080"), "127.0.0.1:8080");
        assert_eq!(normalize_address("localhost:8080"), "localhost:8080");
        assert_eq!(normalize_address("[::1]:8080"), "[::1]:8080");
        assert_eq!(normalize_address(""), "");
        assert_eq!(normalize_address(":"), ":");
    }

    #[test]
    fn binds_ephemeral_port() {
        let listener = BoundListener::bind("127.0.0.1:0").unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[test]
    fn busy_port_is_bind_error() {
        let first = BoundListener::bind("127.0.0.1:0").unwrap();
        let taken = first.local_addr().to_string();
        let err = BoundListener::bind(&taken).unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }

    #[test]
    fn garbage_address_is_bind_error() {
        assert!(matches!(
            BoundListener::bind("not an address"),
            Err(ListenerError::Bind { .. })
        ));
    }
}
