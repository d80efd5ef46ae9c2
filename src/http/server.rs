//! Adapter server setup and run loop.
//!
//! # Responsibilities
//! - Bind the listen address and build the mTLS listener config
//! - Create the Axum router with the telemetry handlers
//! - Wire up middleware (tracing, timeouts, limits, request ID)
//! - Serve until stopped or failed, then report the outcome exactly once
//!
//! # Design Decisions
//! - Construction is synchronous and does all fallible setup, so a bad
//!   credential or busy port is reported before anything runs
//! - TLS is built before binding; a credential error never holds the port
//! - Plaintext when no credentials are present, mutual TLS otherwise
//! - The run loop logs through the logger it was constructed with

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use thiserror::Error;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::instrument::WithSubscriber;

use crate::config::{AdapterConfig, ListenerConfig};
use crate::downstream::{ErrorClassifier, Forwarder, OutboundTransport};
use crate::http::handlers::{self, AppState};
use crate::http::request::X_REQUEST_ID;
use crate::lifecycle::shutdown::ShutdownSender;
use crate::lifecycle::signals;
use crate::net::{build_mtls_config, BoundListener, ListenerError, TlsError};
use crate::observability::{metrics, Logger};
use crate::resilience::RetryPolicy;
use crate::security::TlsMaterial;

/// Why the adapter server could not be built or stopped serving.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server stopped without reporting an outcome")]
    Aborted,
}

/// Everything the server needs, assembled by the orchestrator.
pub struct AdapterParts {
    /// Listen address: `host:port`, `:port` or a bare port.
    pub address: String,
    pub logger: Logger,
    pub transport: Arc<dyn OutboundTransport>,
    pub classifier: Arc<dyn ErrorClassifier>,
    pub tls: TlsMaterial,
    pub config: AdapterConfig,
}

/// Stops a running server, letting in-flight requests drain.
#[derive(Clone)]
pub struct StopHandle {
    handle: Handle,
    drain: Duration,
}

impl StopHandle {
    pub fn stop(&self) {
        self.handle.graceful_shutdown(Some(self.drain));
    }
}

/// The telemetry ingest server.
pub struct AdapterServer {
    listener: BoundListener,
    tls: Option<RustlsConfig>,
    router: Router,
    logger: Logger,
    handle: Handle,
    drain: Duration,
    handle_signals: bool,
}

impl AdapterServer {
    /// Build a server ready to run. Fails on bad TLS material or bind errors.
    pub fn new(parts: AdapterParts) -> Result<Self, AdapterError> {
        let AdapterParts {
            address,
            logger,
            transport,
            classifier,
            tls,
            config,
        } = parts;

        let _log = tracing::dispatcher::set_default(logger.dispatch());

        let tls = build_mtls_config(&tls)?;
        let listener = BoundListener::bind(&address)?;

        let forwarder = Forwarder::new(
            transport,
            classifier,
            config.downstream.url.clone(),
            RetryPolicy::from(&config.downstream),
        );
        let state = AppState {
            forwarder: Arc::new(forwarder),
        };
        let router = build_router(&config.listener, state);

        metrics::record_listener_mode(tls.is_some());
        tracing::info!(
            address = %listener.local_addr(),
            mutual_tls = tls.is_some(),
            downstream = %config.downstream.url,
            "Adapter server constructed"
        );

        Ok(Self {
            listener,
            tls,
            router,
            logger,
            handle: Handle::new(),
            drain: Duration::from_secs(config.listener.drain_timeout_secs),
            handle_signals: config.listener.handle_signals,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn is_mutual_tls(&self) -> bool {
        self.tls.is_some()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            handle: self.handle.clone(),
            drain: self.drain,
        }
    }

    /// Serve until stopped or failed, then report the outcome on `shutdown`.
    pub async fn run(self, shutdown: ShutdownSender) {
        let dispatch = self.logger.dispatch().clone();
        let outcome = self.serve().with_subscriber(dispatch).await;
        shutdown.report(outcome);
    }

    async fn serve(self) -> Result<(), AdapterError> {
        let Self {
            listener,
            tls,
            router,
            handle,
            drain,
            handle_signals,
            ..
        } = self;

        let address = listener.local_addr();
        let mutual_tls = tls.is_some();
        let listener = listener.into_std();
        let app = router.into_make_service();
        let server_handle = handle.clone();

        tracing::info!(address = %address, mutual_tls, "Adapter server starting");

        let serve = async move {
            match tls {
                Some(config) => {
                    axum_server::from_tcp_rustls(listener, config)
                        .handle(server_handle)
                        .serve(app)
                        .await
                }
                None => {
                    axum_server::from_tcp(listener)
                        .handle(server_handle)
                        .serve(app)
                        .await
                }
            }
        };
        tokio::pin!(serve);

        let result = if handle_signals {
            tokio::select! {
                result = &mut serve => result,
                signal = signals::stop_signal() => {
                    tracing::info!(signal = %signal, "Stop signal received, draining connections");
                    handle.graceful_shutdown(Some(drain));
                    serve.await
                }
            }
        } else {
            serve.await
        };

        match result {
            Ok(()) => {
                tracing::info!(address = %address, "Adapter server stopped");
                Ok(())
            }
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Adapter server failed");
                Err(AdapterError::Serve(e))
            }
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(config: &ListenerConfig, state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/v1/telemetry", post(handlers::ingest))
        .with_state(state)
        // The extractor's own 2 MiB cap would override max_body_bytes.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
