//! Mock transport for testing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::transport::{Transport, TransportError};

/// A recorded request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The URL that was fetched.
    pub url: String,
    /// When the fetch was made.
    pub timestamp: Instant,
}

/// Mock implementation of the [`Transport`] trait.
///
/// Provides controllable behavior for testing:
/// - Record every requested URL, in order, for assertions
/// - Serve a FIFO queue of scripted responses, falling back to a default
/// - Fail the next request with an injected error (consumed on use)
/// - Delay responses to widen ordering windows
pub struct MockTransport {
    /// Recorded requests, in arrival order.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    /// Scripted responses served front-first.
    responses: Arc<RwLock<Vec<Value>>>,
    /// Served when no scripted response is queued.
    default_response: Arc<RwLock<Value>>,
    /// If set, the next request fails with this error.
    next_error: Arc<RwLock<Option<TransportError>>>,
    /// Simulated network latency.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &"<requests>")
            .field("responses", &"<responses>")
            .field("default_response", &"<default_response>")
            .field("next_error", &"<next_error>")
            .field("delay", &"<delay>")
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock transport that answers everything with `{}`.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(Vec::new())),
            default_response: Arc::new(RwLock::new(json!({}))),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the response served when the scripted queue is empty.
    pub async fn set_default_response(&self, value: Value) {
        *self.default_response.write().await = value;
    }

    /// Queue a scripted response; responses are served in push order before
    /// the default applies.
    pub async fn push_response(&self, value: Value) {
        self.responses.write().await.push(value);
    }

    /// Configure the next request to fail with the given error. The error is
    /// consumed by that request and is never recorded as a hit.
    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Recorded requests, in arrival order.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Just the requested URLs, in arrival order.
    pub async fn request_urls(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// Number of requests served so far.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<TransportError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.requests.write().await.push(RecordedRequest {
            url: url.to_string(),
            timestamp: Instant::now(),
        });

        let mut responses = self.responses.write().await;
        if responses.is_empty() {
            Ok(self.default_response.read().await.clone())
        } else {
            Ok(responses.remove(0))
        }
    }
}
