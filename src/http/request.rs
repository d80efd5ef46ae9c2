//! Telemetry report payloads.
//!
//! # Responsibilities
//! - Define the JSON body accepted on the ingest endpoint
//! - Carry each metric instance through to the forwarder unchanged

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// One metric instance emitted by the mesh.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricInstance {
    /// Instance name as configured in the mesh (e.g. `requestcount`).
    pub name: String,

    /// Attribute values, passed through without interpretation.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Body of `POST /v1/telemetry`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetryReport {
    pub instances: Vec<MetricInstance>,
}
