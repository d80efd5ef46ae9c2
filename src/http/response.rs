//! Response bodies and error mapping for the telemetry endpoints.
//!
//! # Design Decisions
//! - A rejected batch maps to 502: the stream processor refused it
//! - An unreachable or overloaded stream processor maps to 503
//! - Error bodies carry the error text for the mesh's own logs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::downstream::ForwardError;

/// Body of a successful ingest call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngestResponse {
    pub accepted: usize,
}

/// Body of a failed ingest call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP status reported to the mesh for a forwarding failure.
pub fn status_for(err: &ForwardError) -> StatusCode {
    match err {
        ForwardError::Rejected { .. } => StatusCode::BAD_GATEWAY,
        ForwardError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ForwardError::Unavailable { .. }
        | ForwardError::Unreachable(_)
        | ForwardError::Exhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
