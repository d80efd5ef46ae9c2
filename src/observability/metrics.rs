//! Metrics collection and exposition.
//!
//! # Metrics
//! - `adapter_ingest_requests_total` (counter): ingest calls by response status
//! - `adapter_ingest_instances_total` (counter): metric instances received
//! - `adapter_forward_batches_total` (counter): batches by outcome
//! - `adapter_forward_attempts` (histogram): attempts used per batch
//! - `adapter_forward_duration_seconds` (histogram): time to settle a batch
//! - `adapter_mutual_tls_enabled` (gauge): 1 when the listener requires client certs
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_ingest(instances: usize, status: u16) {
    counter!("adapter_ingest_requests_total", "status" => status.to_string()).increment(1);
    counter!("adapter_ingest_instances_total").increment(instances as u64);
}

pub fn record_forward(outcome: &'static str, attempts: u32, start: Instant) {
    counter!("adapter_forward_batches_total", "outcome" => outcome).increment(1);
    histogram!("adapter_forward_attempts").record(attempts as f64);
    histogram!("adapter_forward_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_listener_mode(mutual_tls: bool) {
    gauge!("adapter_mutual_tls_enabled").set(if mutual_tls { 1.0 } else { 0.0 });
}
