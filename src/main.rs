//! Telemetry adapter
//!
//! Bridges a service mesh's telemetry reports to a stream processor.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │               TELEMETRY ADAPTER               │
//!                         │                                              │
//!     Mesh report         │  ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//!     ────────────────────┼─▶│   net   │───▶│  http   │───▶│downstream│──┼──▶ Stream
//!     (plain or mTLS)     │  │listener │    │ server  │    │forwarder │  │    processor
//!                         │  └─────────┘    └─────────┘    └──────────┘  │
//!                         │                                              │
//!                         │  ┌────────────────────────────────────────┐  │
//!                         │  │          Cross-Cutting Concerns         │  │
//!                         │  │  config · security · observability      │  │
//!                         │  │  resilience · lifecycle                 │  │
//!                         │  └────────────────────────────────────────┘  │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! telemetry-adapter [ADDRESS] [--config PATH]
//! ```
//!
//! Mutual TLS is enabled by setting `GRPC_ADAPTER_CREDENTIAL`,
//! `GRPC_ADAPTER_PRIVATE_KEY` and `GRPC_ADAPTER_CERTIFICATE`.

use std::process::ExitCode;

use telemetry_adapter::config::ProcessEnv;
use telemetry_adapter::observability::TracingLoggerProvider;
use telemetry_adapter::{AdapterServerFactory, Orchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    Orchestrator::new(TracingLoggerProvider, ProcessEnv, AdapterServerFactory)
        .run(std::env::args_os())
        .await
        .exit_code()
}
