//! Telemetry endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::downstream::Forwarder;
use crate::http::request::TelemetryReport;
use crate::http::response::{status_for, IngestResponse};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

pub async fn health() -> &'static str {
    "ok"
}

/// Accept a telemetry report and forward its instances downstream.
pub async fn ingest(State(state): State<AppState>, Json(report): Json<TelemetryReport>) -> Response {
    let count = report.instances.len();
    if count == 0 {
        metrics::record_ingest(0, StatusCode::OK.as_u16());
        return Json(IngestResponse { accepted: 0 }).into_response();
    }

    match state.forwarder.forward(&report.instances).await {
        Ok(attempts) => {
            tracing::debug!(instances = count, attempts, "Report forwarded");
            metrics::record_ingest(count, StatusCode::OK.as_u16());
            Json(IngestResponse { accepted: count }).into_response()
        }
        Err(err) => {
            tracing::warn!(
                instances = count,
                downstream = %state.forwarder.endpoint(),
                error = %err,
                "Report not forwarded"
            );
            metrics::record_ingest(count, status_for(&err).as_u16());
            err.into_response()
        }
    }
}
