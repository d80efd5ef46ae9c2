//! Downstream error classification.
//!
//! Decides whether a transport outcome is a success, a permanent rejection
//! or a transient failure worth retrying.

use reqwest::StatusCode;
use thiserror::Error;

use crate::downstream::transport::{TransportError, TransportResponse};

/// Longest response body excerpt carried in a [`ForwardError::Rejected`].
pub const MAX_ERROR_BODY: usize = 256;

/// Why a batch did not reach the stream processor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// The stream processor refused the batch; resending will not help.
    #[error("stream processor rejected batch with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The stream processor answered but cannot take the batch right now.
    #[error("stream processor unavailable (status {status})")]
    Unavailable { status: u16 },

    /// No response at all.
    #[error("stream processor unreachable: {0}")]
    Unreachable(String),

    /// The batch could not be serialized.
    #[error("failed to encode batch: {0}")]
    Encode(String),

    /// Retries used up; carries the last failure.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ForwardError>,
    },
}

impl ForwardError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ForwardError::Unavailable { .. } | ForwardError::Unreachable(_)
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Rejected { .. } => "rejected",
            ForwardError::Unavailable { .. } => "unavailable",
            ForwardError::Unreachable(_) => "unreachable",
            ForwardError::Encode(_) => "encode",
            ForwardError::Exhausted { .. } => "exhausted",
        }
    }
}

/// Interprets downstream outcomes for the forwarder.
pub trait ErrorClassifier: Send + Sync {
    /// `None` when the outcome counts as delivered.
    fn classify(&self, outcome: &Result<TransportResponse, TransportError>) -> Option<ForwardError>;
}

/// Classification rules of the stream processor's HTTP receiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamProcessorClassifier;

impl ErrorClassifier for StreamProcessorClassifier {
    fn classify(&self, outcome: &Result<TransportResponse, TransportError>) -> Option<ForwardError> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Some(ForwardError::Unreachable(e.to_string())),
        };

        let status = response.status;
        if status.is_success() {
            return None;
        }
        if status.is_server_error()
            || status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
        {
            return Some(ForwardError::Unavailable {
                status: status.as_u16(),
            });
        }
        Some(ForwardError::Rejected {
            status: status.as_u16(),
            message: excerpt(&response.body),
        })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        })
    }

    #[test]
    fn success_statuses_are_delivered() {
        let classifier = StreamProcessorClassifier;
        assert_eq!(classifier.classify(&response(200, "")), None);
        assert_eq!(classifier.classify(&response(202, "queued")), None);
    }

    #[test]
    fn transient_statuses_are_retryable() {
        let classifier = StreamProcessorClassifier;
        for status in [408, 429, 500, 502, 503] {
            let err = classifier.classify(&response(status, "busy")).unwrap();
            assert_eq!(err, ForwardError::Unavailable { status });
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn client_errors_are_rejections() {
        let err = StreamProcessorClassifier
            .classify(&response(400, "  bad stream definition \n"))
            .unwrap();
        assert_eq!(
            err,
            ForwardError::Rejected {
                status: 400,
                message: "bad stream definition".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_errors_are_unreachable() {
        let err = StreamProcessorClassifier
            .classify(&Err(TransportError::Timeout))
            .unwrap();
        assert_eq!(err, ForwardError::Unreachable("request timed out".into()));
        assert!(err.is_retryable());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY * 2);
        match StreamProcessorClassifier.classify(&response(404, &body)) {
            Some(ForwardError::Rejected { message, .. }) => {
                assert_eq!(message.len(), MAX_ERROR_BODY + 3);
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn exhausted_is_terminal() {
        let err = ForwardError::Exhausted {
            attempts: 3,
            last: Box::new(ForwardError::Unavailable { status: 503 }),
        };
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "gave up after 3 attempts: stream processor unavailable (status 503)"
        );
    }
}
