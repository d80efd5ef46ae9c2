//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Check that URLs and socket addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::resilience::RetryPolicy;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if listener.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "listener.max_body_bytes",
            "must be greater than zero",
        ));
    }

    let downstream = &config.downstream;
    match url::Url::parse(&downstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "downstream.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "downstream.url",
            format!("invalid URL '{}': {}", downstream.url, e),
        )),
    }
    if downstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "downstream.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if downstream.max_attempts == 0 {
        errors.push(ValidationError::new(
            "downstream.max_attempts",
            "must be at least 1",
        ));
    }
    if downstream.base_delay_ms > downstream.max_delay_ms {
        errors.push(ValidationError::new(
            "downstream.base_delay_ms",
            format!(
                "{} exceeds max_delay_ms {}",
                downstream.base_delay_ms, downstream.max_delay_ms
            ),
        ));
    }

    // A batch that outlives the ingest request is cut off by the listener
    // timeout instead of settling as delivered or exhausted.
    if listener.request_timeout_secs > 0 && downstream.request_timeout_secs > 0 {
        let attempts = downstream.max_attempts.max(1);
        let budget = Duration::from_secs(downstream.request_timeout_secs)
            .saturating_mul(attempts)
            .saturating_add(RetryPolicy::from(downstream).max_total_delay());
        let limit = Duration::from_secs(listener.request_timeout_secs);
        if budget >= limit {
            errors.push(ValidationError::new(
                "downstream.request_timeout_secs",
                format!(
                    "{} attempts of {}s plus backoff take up to {:?}, not within listener.request_timeout_secs {}",
                    attempts,
                    downstream.request_timeout_secs,
                    budget,
                    listener.request_timeout_secs
                ),
            ));
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
