//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Router};
use telemetry_adapter::config::AdapterConfig;
use telemetry_adapter::downstream::{HttpTransport, StreamProcessorClassifier};
use telemetry_adapter::http::AdapterParts;
use telemetry_adapter::observability::Logger;
use telemetry_adapter::security::TlsMaterial;

/// Bodies received by a mock stream processor, in arrival order.
#[derive(Clone, Default)]
pub struct Received(Arc<Mutex<Vec<serde_json::Value>>>);

impl Received {
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    received: Received,
    calls: Arc<AtomicU32>,
    script: Arc<dyn Fn(u32) -> u16 + Send + Sync>,
}

/// Start a mock stream processor. `script` maps the zero-based call number
/// to the status it answers with.
pub async fn start_programmable_downstream<F>(script: F) -> (SocketAddr, Received)
where
    F: Fn(u32) -> u16 + Send + Sync + 'static,
{
    let received = Received::default();
    let state = MockState {
        received: received.clone(),
        calls: Arc::new(AtomicU32::new(0)),
        script: Arc::new(script),
    };

    let app = Router::new()
        .route("/telemetry", post(mock_receive))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

/// Start a mock stream processor that accepts everything.
pub async fn start_mock_downstream() -> (SocketAddr, Received) {
    start_programmable_downstream(|_| 200).await
}

async fn mock_receive(State(state): State<MockState>, body: String) -> StatusCode {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    if let Ok(value) = serde_json::from_str(&body) {
        state.received.0.lock().unwrap().push(value);
    }
    StatusCode::from_u16((state.script)(call)).unwrap()
}

/// Start a stream processor that accepts connections and never answers.
pub async fn start_hanging_downstream() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Adapter config pointed at `downstream`, with signals off and fast retries.
pub fn test_config(downstream: SocketAddr) -> AdapterConfig {
    let mut config = AdapterConfig::default();
    config.downstream.url = format!("http://{}/telemetry", downstream);
    config.downstream.base_delay_ms = 10;
    config.downstream.max_delay_ms = 50;
    config.listener.handle_signals = false;
    config.listener.drain_timeout_secs = 1;
    config
}

/// Server parts for `config` on an ephemeral loopback port.
pub fn test_parts(config: AdapterConfig, tls: TlsMaterial) -> AdapterParts {
    AdapterParts {
        address: "127.0.0.1:0".into(),
        logger: Logger::disabled(),
        transport: Arc::new(HttpTransport::new(&config.downstream).unwrap()),
        classifier: Arc::new(StreamProcessorClassifier),
        tls,
        config,
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/tls")
        .join(name)
}

pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture(name)).unwrap()
}

/// A rustls client trusting the fixture CA, presenting the fixture client
/// certificate when `with_identity` is set.
pub fn mtls_client(with_identity: bool) -> reqwest::Client {
    let ca = reqwest::Certificate::from_pem(&read_fixture("ca.pem")).unwrap();
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .add_root_certificate(ca)
        .timeout(Duration::from_secs(5));
    if with_identity {
        let mut pem = read_fixture("client.key");
        pem.extend_from_slice(&read_fixture("client.crt"));
        builder = builder.identity(reqwest::Identity::from_pem(&pem).unwrap());
    }
    builder.build().unwrap()
}

/// The three TLS variables pointing at the fixture files.
pub fn fixture_env() -> std::collections::HashMap<String, String> {
    let material = fixture_material();
    [
        ("GRPC_ADAPTER_CREDENTIAL", material.credential),
        ("GRPC_ADAPTER_PRIVATE_KEY", material.private_key),
        ("GRPC_ADAPTER_CERTIFICATE", material.certificate),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

pub fn fixture_material() -> TlsMaterial {
    let path = |name: &str| fixture(name).to_string_lossy().into_owned();
    TlsMaterial {
        credential: path("adapter.crt"),
        private_key: path("adapter.key"),
        certificate: path("ca.pem"),
    }
}

/// Wait for a condition to become true.
pub async fn wait_for<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
