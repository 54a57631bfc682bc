//! The mocking decorator.

use crate::config::ClientSettings;
use crate::error::NetworkError;
use crate::mock::Mock;
use crate::network::{JsonArray, JsonObject, NetworkClient, NetworkRequest};
use crate::pipeline::{Decoder, ResponsePipeline};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// A [`NetworkClient`] that answers some requests from mocks.
///
/// Every request is offered to the registered mocks in order; the first
/// mock whose override strategy accepts it produces the response. Requests
/// no mock accepts go to the wrapped client untouched.
///
/// Mocked responses are produced on tasks spawned on the runtime given at
/// construction. They cannot be cancelled: dropping the future returned by a
/// `request_*` call leaves the spawned work running to completion.
pub struct MockHttpClient<C> {
    network: C,
    mocks: Vec<Arc<dyn Mock>>,
    pipeline: ResponsePipeline,
    settings: ClientSettings,
    /// Total requests processed.
    requests_total: AtomicU64,
    /// Total requests answered by a mock.
    requests_matched: AtomicU64,
    /// Total requests passed through to the network.
    requests_unmatched: AtomicU64,
}

impl<C: NetworkClient> MockHttpClient<C> {
    /// Decorate `network` with `mocks`, decoding typed responses as JSON.
    pub fn new(runtime: Handle, network: C, mocks: Vec<Arc<dyn Mock>>) -> Self {
        Self::with_settings(runtime, network, mocks, ClientSettings::default())
    }

    /// Decorate `network` with `mocks`, decoding typed responses with `decoder`.
    pub fn with_decoder(
        runtime: Handle,
        decoder: Decoder,
        network: C,
        mocks: Vec<Arc<dyn Mock>>,
    ) -> Self {
        let settings = ClientSettings {
            decoder,
            ..ClientSettings::default()
        };
        Self::with_settings(runtime, network, mocks, settings)
    }

    pub fn with_settings(
        runtime: Handle,
        network: C,
        mocks: Vec<Arc<dyn Mock>>,
        settings: ClientSettings,
    ) -> Self {
        info!(
            mocks = mocks.len(),
            decoder = ?settings.decoder,
            "Mock HTTP client initialized"
        );

        Self {
            network,
            mocks,
            pipeline: ResponsePipeline::new(runtime, settings.decoder),
            settings,
            requests_total: AtomicU64::new(0),
            requests_matched: AtomicU64::new(0),
            requests_unmatched: AtomicU64::new(0),
        }
    }

    /// The mock that would answer `request` if it were sent now.
    ///
    /// Only asks [`OverrideStrategy::would_override`], so inspecting never
    /// uses up a limited mock's matches.
    ///
    /// [`OverrideStrategy::would_override`]: crate::OverrideStrategy::would_override
    pub fn find_mock(&self, request: &NetworkRequest) -> Option<&Arc<dyn Mock>> {
        self.mocks
            .iter()
            .find(|mock| mock.override_strategy().would_override(mock.as_ref(), request))
    }

    /// The wrapped client.
    pub fn network(&self) -> &C {
        &self.network
    }

    /// Registered mocks, in matching order.
    pub fn mocks(&self) -> &[Arc<dyn Mock>] {
        &self.mocks
    }

    /// Get total requests processed.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Get total requests answered by a mock.
    pub fn total_matched(&self) -> u64 {
        self.requests_matched.load(Ordering::Relaxed)
    }

    /// Get total requests passed through.
    pub fn total_unmatched(&self) -> u64 {
        self.requests_unmatched.load(Ordering::Relaxed)
    }

    /// Pick the mock for `request`, counting and logging the decision.
    fn route(&self, request: &NetworkRequest) -> Option<&dyn Mock> {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let matched = self
            .mocks
            .iter()
            .find(|mock| mock.override_strategy().should_override(mock.as_ref(), request));

        match matched {
            Some(mock) => {
                self.requests_matched.fetch_add(1, Ordering::Relaxed);
                if self.settings.log_matches {
                    info!(
                        mock = mock.name().unwrap_or("unnamed"),
                        method = %request.method,
                        path = %request.path,
                        "Request matched mock"
                    );
                }
                Some(mock.as_ref())
            }
            None => {
                self.requests_unmatched.fetch_add(1, Ordering::Relaxed);
                if self.settings.log_unmatched {
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        "No matching mock, passing through"
                    );
                }
                None
            }
        }
    }
}

#[async_trait]
impl<C: NetworkClient> NetworkClient for MockHttpClient<C> {
    async fn request_bytes(&self, request: &NetworkRequest) -> Result<Bytes, NetworkError> {
        match self.route(request) {
            Some(mock) => self.pipeline.fetch_bytes(mock).await,
            None => self.network.request_bytes(request).await,
        }
    }

    async fn request_json_object(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonObject, NetworkError> {
        match self.route(request) {
            Some(mock) => self.pipeline.json_object(mock).await,
            None => self.network.request_json_object(request).await,
        }
    }

    async fn request_json_array(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonArray, NetworkError> {
        match self.route(request) {
            Some(mock) => self.pipeline.json_array(mock).await,
            None => self.network.request_json_array(request).await,
        }
    }

    async fn request_decoded<T>(&self, request: &NetworkRequest) -> Result<T, NetworkError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.route(request) {
            Some(mock) => self.pipeline.decoded(mock).await,
            None => self.network.request_decoded(request).await,
        }
    }
}
