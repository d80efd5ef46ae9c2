//! Forwarding of metric instances to the stream processor.

use std::sync::Arc;
use std::time::Instant;

use crate::downstream::classifier::{ErrorClassifier, ForwardError};
use crate::downstream::transport::{OutboundTransport, TransportRequest};
use crate::http::request::MetricInstance;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Sends batches downstream with bounded retries.
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn OutboundTransport>,
    classifier: Arc<dyn ErrorClassifier>,
    endpoint: String,
    retry: RetryPolicy,
}

impl Forwarder {
    pub fn new(
        transport: Arc<dyn OutboundTransport>,
        classifier: Arc<dyn ErrorClassifier>,
        endpoint: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            classifier,
            endpoint: endpoint.into(),
            retry,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver `instances` as one JSON array. Returns the number of attempts
    /// used on success.
    pub async fn forward(&self, instances: &[MetricInstance]) -> Result<u32, ForwardError> {
        let body = serde_json::to_vec(instances).map_err(|e| ForwardError::Encode(e.to_string()))?;
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self
                .transport
                .send(TransportRequest::post_json(&self.endpoint, body.clone()))
                .await;

            let err = match self.classifier.classify(&outcome) {
                None => {
                    metrics::record_forward("delivered", attempt, start);
                    tracing::debug!(
                        endpoint = %self.endpoint,
                        instances = instances.len(),
                        attempt,
                        "Batch delivered"
                    );
                    return Ok(attempt);
                }
                Some(err) => err,
            };

            if !err.is_retryable() {
                metrics::record_forward(err.kind(), attempt, start);
                tracing::warn!(endpoint = %self.endpoint, attempt, error = %err, "Batch rejected");
                return Err(err);
            }

            if !self.retry.allows_retry_after(attempt) {
                let exhausted = ForwardError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                };
                metrics::record_forward(exhausted.kind(), attempt, start);
                tracing::error!(endpoint = %self.endpoint, error = %exhausted, "Giving up on batch");
                return Err(exhausted);
            }

            let delay = self.retry.delay_after(attempt);
            tracing::info!(
                endpoint = %self.endpoint,
                attempt,
                delay = ?delay,
                error = %err,
                "Retrying batch"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
