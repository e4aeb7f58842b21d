//! Testing utilities: mock implementations of the external boundaries.
//!
//! # Example
//!
//! ```rust,ignore
//! use phenoq_core::testing::MockTransport;
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.push_response(serde_json::json!({ "genes": [] })).await;
//!
//! let client = HpoClient::with_transport(ClientConfig::default(), transport.clone());
//! // ... exercise the client, then assert on transport.request_urls().await
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedRequest};
