//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration and the listen address
//! - Initialize the logger, credentials, transport and classifier in order
//! - Construct the adapter server and launch it on one background task
//! - Block until the server reports, then turn that report into an exit code
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and never retried
//! - Subsystems initialize in order, not concurrently
//! - Nothing after a failed step runs; a failed logger means the TLS
//!   variables are never read
//! - The logger guard is dropped (flushed) on every exit path

use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::instrument::WithSubscriber;

use crate::config::{load_or_default, resolve_listen_address, AdapterConfig, Cli, Environment};
use crate::downstream::{
    ErrorClassifier, HttpTransport, OutboundTransport, StreamProcessorClassifier,
};
use crate::http::{AdapterError, AdapterParts, AdapterServer};
use crate::lifecycle::shutdown::{self, ShutdownSender};
use crate::observability::{metrics, Logger, LoggerProvider};
use crate::security::resolve_tls_material;

/// Stages of the adapter process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    LoggerReady,
    CredentialsResolved,
    ServerConstructed,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Init => "init",
            LifecycleState::LoggerReady => "logger-ready",
            LifecycleState::CredentialsResolved => "credentials-resolved",
            LifecycleState::ServerConstructed => "server-constructed",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How the process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The server reported a clean stop.
    Clean,
    /// A step before `Running` failed.
    StartupFailed,
    /// The server reported an error.
    ServerFailed,
    /// Argument parsing ended the process (`--help`, `--version` or bad usage).
    Usage(i32),
}

/// Final result of [`Orchestrator::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Last stage reached before terminating.
    pub stage: LifecycleState,
    pub status: ExitStatus,
}

impl Termination {
    fn new(stage: LifecycleState, status: ExitStatus) -> Self {
        Self { stage, status }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.status {
            ExitStatus::Clean => ExitCode::SUCCESS,
            ExitStatus::StartupFailed | ExitStatus::ServerFailed => ExitCode::FAILURE,
            ExitStatus::Usage(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        }
    }
}

/// Builds the adapter server from its parts.
pub trait AdapterFactory {
    type Server: AdapterRunner;

    fn build(&self, parts: AdapterParts) -> Result<Self::Server, AdapterError>;
}

/// A constructed server that can be launched on a background task.
pub trait AdapterRunner: Send + 'static {
    fn run(self, shutdown: ShutdownSender) -> impl Future<Output = ()> + Send + 'static;
}

impl AdapterRunner for AdapterServer {
    fn run(self, shutdown: ShutdownSender) -> impl Future<Output = ()> + Send + 'static {
        AdapterServer::run(self, shutdown)
    }
}

/// Builds the real [`AdapterServer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterServerFactory;

impl AdapterFactory for AdapterServerFactory {
    type Server = AdapterServer;

    fn build(&self, parts: AdapterParts) -> Result<AdapterServer, AdapterError> {
        AdapterServer::new(parts)
    }
}

/// Drives the adapter from process start to exit.
pub struct Orchestrator<P, E, F> {
    logging: P,
    env: E,
    factory: F,
}

impl<P, E, F> Orchestrator<P, E, F>
where
    P: LoggerProvider,
    E: Environment,
    F: AdapterFactory,
{
    pub fn new(logging: P, env: E, factory: F) -> Self {
        Self {
            logging,
            env,
            factory,
        }
    }

    /// Run the adapter with the process arguments (program name first).
    pub async fn run<I, T>(self, args: I) -> Termination
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let stage = LifecycleState::Init;

        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                let _ = e.print();
                return Termination::new(stage, ExitStatus::Usage(e.exit_code()));
            }
        };

        let config = match load_or_default(cli.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("telemetry-adapter: {}", e);
                return Termination::new(stage, ExitStatus::StartupFailed);
            }
        };
        let address = resolve_listen_address(&cli, &config);

        let guard = match self.logging.new_logger(&config.observability) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("telemetry-adapter: unable to create logger: {}", e);
                return Termination::new(stage, ExitStatus::StartupFailed);
            }
        };

        let logger = guard.logger().clone();
        let dispatch = logger.dispatch().clone();
        let termination = supervise(self.env, self.factory, logger, config, address)
            .with_subscriber(dispatch)
            .await;

        drop(guard);
        termination
    }
}

async fn supervise<E, F>(
    env: E,
    factory: F,
    logger: Logger,
    config: AdapterConfig,
    address: String,
) -> Termination
where
    E: Environment,
    F: AdapterFactory,
{
    let mut stage = LifecycleState::LoggerReady;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), address = %address, "Telemetry adapter starting");

    let tls = resolve_tls_material(&env);
    if tls.is_empty() {
        tracing::info!("No TLS credentials in environment, serving plain text");
    } else {
        tracing::info!(material = ?tls, "TLS credentials found, serving mutual TLS");
    }
    advance(&mut stage, LifecycleState::CredentialsResolved);

    // The exporter serves scrapes from its own task, outside the shutdown handoff.
    if let Some(metrics_address) = config.observability.metrics_address.as_deref() {
        match metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::warn!(address = %metrics_address, error = %e, "Metrics exporter not started");
                }
            }
            Err(e) => {
                tracing::warn!(address = %metrics_address, error = %e, "Invalid metrics address");
            }
        }
    }

    let transport: Arc<dyn OutboundTransport> = match HttpTransport::new(&config.downstream) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            tracing::error!(error = %e, "Unable to create downstream transport");
            return Termination::new(stage, ExitStatus::StartupFailed);
        }
    };
    let classifier: Arc<dyn ErrorClassifier> = Arc::new(StreamProcessorClassifier);

    let parts = AdapterParts {
        address,
        logger,
        transport,
        classifier,
        tls,
        config,
    };
    let server = match factory.build(parts) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Unable to start server");
            return Termination::new(stage, ExitStatus::StartupFailed);
        }
    };
    advance(&mut stage, LifecycleState::ServerConstructed);

    let (tx, rx) = shutdown::channel();
    // Detached: the server reports through the channel, not the join handle.
    tokio::spawn(server.run(tx));
    advance(&mut stage, LifecycleState::Running);

    let outcome = rx.wait().await;
    advance(&mut stage, LifecycleState::ShuttingDown);

    let status = match outcome {
        Ok(()) => {
            tracing::info!("Adapter shut down cleanly");
            ExitStatus::Clean
        }
        Err(e) => {
            tracing::error!(error = %e, "Adapter shut down with error");
            ExitStatus::ServerFailed
        }
    };
    Termination::new(stage, status)
}

fn advance(stage: &mut LifecycleState, next: LifecycleState) {
    tracing::debug!(from = %stage, to = %next, "Lifecycle transition");
    *stage = next;
}
