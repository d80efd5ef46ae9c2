//! Mutual TLS configuration and certificate loading.
//!
//! Each artifact is either a path to a PEM file or the PEM text itself.
//! Clients must present a certificate signed by the configured CA bundle.

use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use thiserror::Error;

use crate::security::TlsMaterial;

/// Errors building the server TLS configuration.
#[derive(Debug, Error)]
pub enum TlsError {
    /// Some but not all of the three artifacts were supplied.
    #[error("incomplete mutual TLS material, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    /// A PEM file could not be read.
    #[error("failed to read {what} from {path}: {source}")]
    Read {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PEM data could not be parsed.
    #[error("malformed {what}: {source}")]
    Pem {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The PEM data held no certificate.
    #[error("no certificates found in {0}")]
    NoCertificates(&'static str),

    /// The PEM data held no private key.
    #[error("no private key found in server private key")]
    NoPrivateKey,

    /// The CA bundle could not be turned into a client verifier.
    #[error("invalid client CA bundle: {0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),

    /// rustls refused the certificate/key pair or protocol setup.
    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] rustls::Error),
}

const SERVER_CERTIFICATE: &str = "server certificate";
const SERVER_KEY: &str = "server private key";
const CLIENT_CA: &str = "client CA bundle";

/// Build the listener's TLS config. `Ok(None)` means plain text.
pub fn build_mtls_config(material: &TlsMaterial) -> Result<Option<RustlsConfig>, TlsError> {
    if material.is_empty() {
        return Ok(None);
    }
    let missing = material.missing();
    if !missing.is_empty() {
        return Err(TlsError::Incomplete { missing });
    }

    let certs = load_certs(&material.credential, SERVER_CERTIFICATE)?;
    let key = load_private_key(&material.private_key)?;
    let roots = load_roots(&material.certificate)?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()?;

    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    tracing::debug!("Mutual TLS configuration built");
    Ok(Some(RustlsConfig::from_config(Arc::new(config))))
}

/// Inline PEM text or the contents of the file it names.
fn read_pem(value: &str, what: &'static str) -> Result<Vec<u8>, TlsError> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.as_bytes().to_vec());
    }
    std::fs::read(Path::new(value)).map_err(|source| TlsError::Read {
        what,
        path: value.to_string(),
        source,
    })
}

fn load_certs(value: &str, what: &'static str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let pem = read_pem(value, what)?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Pem { what, source })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(what));
    }
    Ok(certs)
}

fn load_private_key(value: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    let pem = read_pem(value, SERVER_KEY)?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|source| TlsError::Pem {
            what: SERVER_KEY,
            source,
        })?
        .ok_or(TlsError::NoPrivateKey)
}

fn load_roots(value: &str) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();
    for cert in load_certs(value, CLIENT_CA)? {
        roots.add(cert)?;
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/tls/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn material() -> TlsMaterial {
        TlsMaterial {
            credential: fixture("adapter.crt"),
            private_key: fixture("adapter.key"),
            certificate: fixture("ca.pem"),
        }
    }

    #[test]
    fn empty_material_means_plain_text() {
        assert!(build_mtls_config(&TlsMaterial::default()).unwrap().is_none());
    }

    #[test]
    fn builds_from_files() {
        assert!(build_mtls_config(&material()).unwrap().is_some());
    }

    #[test]
    fn builds_from_inline_pem() {
        let inline = |name: &str| std::fs::read_to_string(fixture(name)).unwrap();
        let material = TlsMaterial {
            credential: inline("adapter.crt"),
            private_key: inline("adapter.key"),
            certificate: inline("ca.pem"),
        };
        assert!(build_mtls_config(&material).unwrap().is_some());
    }

    #[test]
    fn partial_material_is_rejected() {
        let mut material = material();
        material.private_key.clear();
        let err = build_mtls_config(&material).unwrap_err();
        assert!(matches!(
            err,
            TlsError::Incomplete { ref missing } if missing == &vec!["GRPC_ADAPTER_PRIVATE_KEY"]
        ));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let mut material = material();
        material.certificate = "/nonexistent/ca.pem".into();
        let err = build_mtls_config(&material).unwrap_err();
        assert!(matches!(err, TlsError::Read { what: CLIENT_CA, .. }));
        assert!(err.to_string().contains("/nonexistent/ca.pem"));
    }

    #[test]
    fn garbage_certificate_has_no_certs() {
        let mut material = material();
        material.credential = "-----BEGIN NOTHING-----\nAAAA\n-----END NOTHING-----\n".into();
        assert!(matches!(
            build_mtls_config(&material),
            Err(TlsError::NoCertificates(SERVER_CERTIFICATE))
        ));
    }

    #[test]
    fn certificate_file_as_key_has_no_private_key() {
        let mut material = material();
        material.private_key = fixture("adapter.crt");
        assert!(matches!(
            build_mtls_config(&material),
            Err(TlsError::NoPrivateKey)
        ));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let mut material = material();
        material.private_key = fixture("client.key");
        assert!(matches!(
            build_mtls_config(&material),
            Err(TlsError::Rustls(_))
        ));
    }
}
