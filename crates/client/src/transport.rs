//! Outbound HTTP transport.
//!
//! The dispatcher only sees the [`Transport`] trait; [`HttpTransport`] is the `reqwest`
//! implementation used in production. Tests plug in canned transports.

use std::time::Duration;

use async_trait::async_trait;
use fleetdeck_core::CsrfToken;
use serde_json::Value;
use thiserror::Error;

/// Header carrying the anti-forgery token on GET requests (which have no body).
pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully-resolved request handed to the transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub token: CsrfToken,
    /// JSON body; always `None` for GET.
    pub body: Option<Value>,
}

/// Whatever came back over the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase for `status` ("Bad Request"), empty if unknown.
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// One-shot request execution.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportFailure>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportFailure> {
        let req = match request.method {
            Method::Get => self
                .client
                .get(&request.url)
                .header(CSRF_HEADER, request.token.as_str()),
            Method::Post => {
                let body = request.body.unwrap_or(Value::Null);
                self.client.post(&request.url).json(&body)
            }
        };

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout(e.to_string())
            } else {
                TransportFailure::Network(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportFailure::Body(e.to_string()))?;

        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_response_fills_reason_phrase() {
        let resp = RawResponse::new(400, "{}");
        assert_eq!(resp.reason, "Bad Request");
        assert!(!resp.is_success());
        assert!(RawResponse::new(204, "").is_success());
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        assert_eq!(RawResponse::new(599, "").reason, "");
    }
}
