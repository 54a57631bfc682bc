//! Zentinel Mock HTTP Client
//!
//! A decorator for HTTP clients that answers selected requests with
//! pre-programmed responses, so tests run offline and deterministically
//! without touching the code that makes the calls.
//!
//! # Features
//!
//! - **Request Matching**: Match by request equality or a closure, optionally
//!   limited to a number of matches
//! - **Byte Sources**: In-memory bytes, JSON values, encoded text, fixture
//!   files looked up by name, file locations
//! - **Rotating Responses**: Answer repeated requests from a round-robin list
//! - **Latency Simulation**: Delay mocked responses
//! - **Failure Injection**: Mocked bodies that always fail
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zentinel_mock_http_client::{
//!     DataReadStrategy, MockHttpClient, NetworkClient, NetworkRequest, OfflineClient, SingleMock,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = SingleMock::for_request(
//!     NetworkRequest::get("/users/1"),
//!     Arc::new(DataReadStrategy::from_json(&serde_json::json!({"id": 1}))?),
//! );
//! let client = MockHttpClient::new(
//!     tokio::runtime::Handle::current(),
//!     OfflineClient,
//!     vec![Arc::new(user)],
//! );
//!
//! let body = client.request_json_object(&NetworkRequest::get("/users/1")).await?;
//! assert_eq!(body["id"], 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Settings
//!
//! ```yaml
//! log_matches: true
//! log_unmatched: false
//! decoder: json
//! fixtures_dir: fixtures
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod network;
pub mod override_strategy;
pub mod pipeline;
pub mod read_strategy;

pub use client::MockHttpClient;
pub use config::ClientSettings;
pub use error::{MockError, NetworkError};
pub use mock::{Mock, RotatingMock, SingleMock};
pub use network::{JsonArray, JsonObject, NetworkClient, NetworkRequest, OfflineClient};
pub use override_strategy::{
    CompareOverrideStrategy, LimitedOverrideStrategy, OverrideStrategy, PredicateOverrideStrategy,
};
pub use pipeline::{Decoder, ResponsePipeline};
pub use read_strategy::{
    BundleReadStrategy, DataReadStrategy, DirectoryBundle, FailingReadStrategy, ReadStrategy,
    ResourceBundle, TextEncoding, UrlReadStrategy,
};
