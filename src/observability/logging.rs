//! Structured logging.
//!
//! # Responsibilities
//! - Build the process logger once, at startup
//! - Hand out an explicit [`Logger`] handle to components that log
//! - Flush buffered output when the [`LoggerGuard`] goes out of scope
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, compact format for development
//! - `RUST_LOG` overrides the configured level
//! - A logger that failed to build is never used to report its own failure

use std::io::Write;

use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Why the logger could not be built.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to install logger: {0}")]
    Install(#[from] tracing::dispatcher::SetGlobalDefaultError),
}

/// Handle to the structured logger. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// A logger that discards everything.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

/// Destination whose buffered output can be forced out.
pub trait LogSink: Send {
    fn sync(&mut self) -> std::io::Result<()>;
}

/// The standard streams the fmt layer writes to.
#[derive(Debug, Default)]
pub struct StdioSink;

impl LogSink for StdioSink {
    fn sync(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()
    }
}

/// Owns the logger for the life of the process; flushes on drop.
pub struct LoggerGuard {
    logger: Logger,
    sink: Box<dyn LogSink>,
}

impl LoggerGuard {
    pub fn new(logger: Logger, sink: impl LogSink + 'static) -> Self {
        Self {
            logger,
            sink: Box::new(sink),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Flush buffered log lines.
    pub fn sync(&mut self) {
        if let Err(e) = self.sink.sync() {
            // the logger itself is what failed
            eprintln!("failed to flush logger: {}", e);
        }
    }
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        self.sync();
    }
}

impl std::fmt::Debug for LoggerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerGuard")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

/// Builds the process logger.
pub trait LoggerProvider {
    fn new_logger(&self, config: &ObservabilityConfig) -> Result<LoggerGuard, LoggingError>;
}

/// tracing-subscriber logger installed as the global default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoggerProvider;

impl LoggerProvider for TracingLoggerProvider {
    fn new_logger(&self, config: &ObservabilityConfig) -> Result<LoggerGuard, LoggingError> {
        let dispatch = build_dispatch(config)?;
        tracing::dispatcher::set_global_default(dispatch.clone())?;
        Ok(LoggerGuard::new(Logger::new(dispatch), StdioSink))
    }
}

fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| LoggingError::Filter {
        directive: config.log_level.clone(),
        source,
    })
}

/// Build the subscriber without installing it.
pub fn build_dispatch(config: &ObservabilityConfig) -> Result<Dispatch, LoggingError> {
    let registry = tracing_subscriber::registry().with(build_filter(config)?);
    let dispatch = match config.log_format {
        LogFormat::Compact => Dispatch::new(registry.with(fmt::layer().compact().with_target(true))),
        LogFormat::Json => Dispatch::new(registry.with(fmt::layer().json())),
    };
    Ok(dispatch)
}
