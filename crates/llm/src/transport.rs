//! HTTP transport seam.
//!
//! The generation client talks to the backend through [`Transport`], so the
//! retry policy can be exercised without a live server.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

use helpdesk_core::{HelpdeskError, Result};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The configured timeout elapsed
    Timeout,
    /// The backend could not be reached
    Connect(String),
    /// Any other transport failure
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("request timed out"),
            Self::Connect(msg) => write!(f, "connection failed: {}", msg),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

/// Minimal HTTP surface needed by the generation client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET {base}{path}`.
    async fn get(&self, path: &str) -> std::result::Result<RawResponse, TransportError>;

    /// `POST {base}{path}` with a JSON body.
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client. The client and its
/// connections are released when this value is dropped.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| HelpdeskError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn finish(
        response: std::result::Result<reqwest::Response, reqwest::Error>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let response = response.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> std::result::Result<RawResponse, TransportError> {
        debug!("GET {}", self.url(path));
        Self::finish(self.client.get(self.url(path)).send().await).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<RawResponse, TransportError> {
        debug!("POST {}", self.url(path));
        Self::finish(self.client.post(self.url(path)).json(body).send().await).await
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
