//! The network client abstraction the mock layer decorates.

use crate::error::NetworkError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A parsed JSON object.
pub type JsonObject = Map<String, Value>;

/// A parsed JSON array.
pub type JsonArray = Vec<Value>;

/// An outbound call: method, target path, query parameters, headers and body.
///
/// Two requests are equal when every part is equal. The method is stored
/// uppercased and a query string embedded in the path is split into
/// [`query`](Self::query), so `get("/a?x=1")` equals
/// `get("/a").with_query("x", "1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkRequest {
    /// HTTP method, uppercased
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// Decoded query parameters
    pub query: BTreeMap<String, String>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body
    pub body: Option<Bytes>,
}

impl NetworkRequest {
    /// Create a request for `method` and `target` (path with optional query string).
    pub fn new(method: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        let target = target.as_ref();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query_string(query)),
            None => (target, BTreeMap::new()),
        };

        Self {
            method: method.as_ref().to_uppercase(),
            path: path.to_string(),
            query,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(target: impl AsRef<str>) -> Self {
        Self::new("GET", target)
    }

    pub fn post(target: impl AsRef<str>) -> Self {
        Self::new("POST", target)
    }

    pub fn put(target: impl AsRef<str>) -> Self {
        Self::new("PUT", target)
    }

    pub fn delete(target: impl AsRef<str>) -> Self {
        Self::new("DELETE", target)
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for NetworkRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        let mut separator = '?';
        for (name, value) in &self.query {
            write!(f, "{}{}={}", separator, name, value)?;
            separator = '&';
        }
        Ok(())
    }
}

/// The surface of an HTTP client.
///
/// [`MockHttpClient`](crate::MockHttpClient) implements this trait by
/// decorating another implementation, so call sites written against
/// `NetworkClient` work unchanged with or without mocks.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Fetch the raw response body.
    async fn request_bytes(&self, request: &NetworkRequest) -> Result<Bytes, NetworkError>;

    /// Fetch the response body parsed as a JSON object.
    async fn request_json_object(&self, request: &NetworkRequest)
        -> Result<JsonObject, NetworkError>;

    /// Fetch the response body parsed as a JSON array.
    async fn request_json_array(&self, request: &NetworkRequest)
        -> Result<JsonArray, NetworkError>;

    /// Fetch the response body decoded into `T`.
    async fn request_decoded<T>(&self, request: &NetworkRequest) -> Result<T, NetworkError>
    where
        T: DeserializeOwned + Send + 'static;
}

/// A client with no network behind it.
///
/// Every call fails with [`NetworkError::Transport`]. Useful as the wrapped
/// client when every request is expected to hit a mock.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl OfflineClient {
    fn refuse(request: &NetworkRequest) -> NetworkError {
        NetworkError::Transport(format!("offline, no mock for {}", request))
    }
}

#[async_trait]
impl NetworkClient for OfflineClient {
    async fn request_bytes(&self, request: &NetworkRequest) -> Result<Bytes, NetworkError> {
        Err(Self::refuse(request))
    }

    async fn request_json_object(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonObject, NetworkError> {
        Err(Self::refuse(request))
    }

    async fn request_json_array(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonArray, NetworkError> {
        Err(Self::refuse(request))
    }

    async fn request_decoded<T>(&self, request: &NetworkRequest) -> Result<T, NetworkError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Err(Self::refuse(request))
    }
}

/// Parse a query string into key-value pairs.
fn parse_query_string(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    for part in query.split('&') {
        if part.is_empty() {
            continue;
        }
        if let Some((key, value)) = part.split_once('=') {
            params.insert(urlencoding_decode(key), urlencoding_decode(value));
        } else {
            params.insert(urlencoding_decode(part), String::new());
        }
    }

    params
}

/// Percent-decoding; `+` becomes a space.
fn urlencoding_decode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(plus_decoded.as_bytes())).into_owned()
}
