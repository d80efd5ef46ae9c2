//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Issue a request (method, URL, body) to the stream processor
//! - Return the status and body, or a transport-level error
//!
//! The adapter server only sees [`OutboundTransport`]; [`HttpTransport`] is
//! the reqwest-backed implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use thiserror::Error;

use crate::config::DownstreamConfig;

/// A request for the downstream endpoint.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl TransportRequest {
    /// A JSON `POST` to `url`.
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body,
            content_type: "application/json",
        }
    }
}

/// What came back, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Failures below HTTP status level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::Config(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Anything able to carry a request to the stream processor.
#[async_trait]
pub trait OutboundTransport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport. The client is reused for connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &DownstreamConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OutboundTransport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .request(request.method, &request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
