//! Mutual TLS credential resolution.
//!
//! # Responsibilities
//! - Read the three TLS variables from the environment, once, at startup
//! - Hand them over verbatim; format and completeness checks happen when
//!   the adapter server builds its TLS config

use crate::config::Environment;

/// Server certificate chain (PEM path or inline PEM).
pub const GRPC_ADAPTER_CREDENTIAL: &str = "GRPC_ADAPTER_CREDENTIAL";
/// Server private key (PEM path or inline PEM).
pub const GRPC_ADAPTER_PRIVATE_KEY: &str = "GRPC_ADAPTER_PRIVATE_KEY";
/// CA bundle used to verify client certificates (PEM path or inline PEM).
pub const GRPC_ADAPTER_CERTIFICATE: &str = "GRPC_ADAPTER_CERTIFICATE";

/// The three artifacts that turn on mutual TLS.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TlsMaterial {
    pub credential: String,
    pub private_key: String,
    pub certificate: String,
}

impl TlsMaterial {
    /// No artifact supplied: serve plain text.
    pub fn is_empty(&self) -> bool {
        self.credential.is_empty() && self.private_key.is_empty() && self.certificate.is_empty()
    }

    /// Names of the variables that are empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (GRPC_ADAPTER_CREDENTIAL, &self.credential),
            (GRPC_ADAPTER_PRIVATE_KEY, &self.private_key),
            (GRPC_ADAPTER_CERTIFICATE, &self.certificate),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// Key material must never end up in logs.
impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = |value: &str| if value.is_empty() { "<unset>" } else { "<set>" };
        f.debug_struct("TlsMaterial")
            .field("credential", &state(&self.credential))
            .field("private_key", &state(&self.private_key))
            .field("certificate", &state(&self.certificate))
            .finish()
    }
}

/// Read the TLS variables. Unset variables become empty strings; never fails.
pub fn resolve_tls_material(env: &impl Environment) -> TlsMaterial {
    let read = |key: &str| env.var(key).unwrap_or_default();
    TlsMaterial {
        credential: read(GRPC_ADAPTER_CREDENTIAL),
        private_key: read(GRPC_ADAPTER_PRIVATE_KEY),
        certificate: read(GRPC_ADAPTER_CERTIFICATE),
    }
}
