//! HTTP boundary.
//!
//! Client operations consume the transport as a plain `fetch(url) -> JSON`
//! capability; the dispatcher never sees it. The real implementation is a
//! thin [`reqwest`] wrapper that never retries and surfaces every failure to
//! the caller unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

/// How much of a non-2xx body is kept in the error.
const ERROR_BODY_LIMIT: usize = 200;

/// Error type for transport operations.
///
/// Payloads are plain strings rather than wrapped [`reqwest::Error`]s so
/// every variant can be constructed by test doubles.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Fetches one URL and returns its JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError>;
}

/// reqwest-backed [`Transport`].
///
/// TLS certificate validation follows `ClientConfig::accept_invalid_certs`,
/// which defaults to **true**: the service has historically been reached
/// through endpoints with invalid certificates, and callers relying on that
/// keep working. Set it to `false` to get ordinary certificate checking.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(default_user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self { client })
    }
}

fn default_user_agent() -> String {
    format!("phenoq/{}", env!("CARGO_PKG_VERSION"))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        debug!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else if e.is_connect() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
