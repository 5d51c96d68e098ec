//! Transport seam between the runner and the network

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use super::request::PreparedRequest;
use crate::common::{Error, Result};

/// What the service answered
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub latency: Duration,
}

/// Classification of transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, TLS handshake
    Connect,
    /// Request exceeded the configured timeout
    Timeout,
    /// Anything else that kept a response from arriving
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Timeout => "request timed out",
            TransportErrorKind::Other => "transport error",
        };
        write!(f, "{label}")
    }
}

/// The request never produced a response
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sends prepared requests, one attempt each
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, TransportError>;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chat-contract/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(
            scenario = request.scenario_id,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        let started = Instant::now();
        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(classify)?;
        let latency = started.elapsed();

        tracing::debug!(
            scenario = request.scenario_id,
            status,
            latency_ms = latency.as_millis() as u64,
            bytes = bytes.len(),
            "Received response"
        );

        Ok(RawResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            latency,
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };

    // reqwest's own message omits the underlying cause (DNS, refused, ...)
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }

    TransportError::new(kind, message)
}
