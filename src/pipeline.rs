//! Turning a matched mock into a response.
//!
//! The pipeline waits for the mock's delay, reads its bytes off the async
//! worker threads, then shapes them the way the caller asked for: raw
//! bytes, a JSON object, a JSON array or a decoded value. Every failure
//! comes out as a [`NetworkError`].

use crate::error::{MockError, NetworkError};
use crate::mock::Mock;
use crate::network::{JsonArray, JsonObject};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Format used by [`request_decoded`](crate::NetworkClient::request_decoded)
/// for mocked bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoder {
    #[default]
    Json,
    /// YAML; also accepts JSON bodies
    Yaml,
}

impl Decoder {
    /// Decode `bytes` into `T`.
    ///
    /// Malformed or mismatched input is a [`NetworkError::Decode`]; anything
    /// else the decoder reports is a [`NetworkError::Unknown`].
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, NetworkError> {
        match self {
            Decoder::Json => serde_json::from_slice(bytes).map_err(|e| match e.classify() {
                serde_json::error::Category::Io => NetworkError::unknown(e),
                _ => NetworkError::decode(e),
            }),
            Decoder::Yaml => serde_yaml::from_slice(bytes).map_err(NetworkError::decode),
        }
    }
}

/// Produces responses for matched mocks on a runtime.
#[derive(Debug, Clone)]
pub struct ResponsePipeline {
    runtime: Handle,
    decoder: Decoder,
}

impl ResponsePipeline {
    pub fn new(runtime: Handle, decoder: Decoder) -> Self {
        Self { runtime, decoder }
    }

    pub fn decoder(&self) -> Decoder {
        self.decoder
    }

    /// Wait the mock's delay, then read its current strategy.
    ///
    /// The work runs on a task spawned on the pipeline's runtime and is not
    /// cancelled if the returned future is dropped.
    pub async fn fetch_bytes(&self, mock: &dyn Mock) -> Result<Bytes, NetworkError> {
        let strategy = mock.current_read_strategy();
        let delay = mock.delay();
        let mock_name = mock.name().unwrap_or("unnamed").to_string();

        let task = self.runtime.spawn(async move {
            if !delay.is_zero() {
                debug!(mock = %mock_name, delay_ms = delay.as_millis() as u64, "Applying delay");
                tokio::time::sleep(delay).await;
            }
            let read = tokio::task::spawn_blocking(move || strategy.read()).await;
            (mock_name, read)
        });

        match task.await {
            Ok((_, Ok(Ok(bytes)))) => Ok(bytes),
            Ok((mock_name, Ok(Err(error)))) => {
                warn!(mock = %mock_name, error = %error, "Mock read strategy failed");
                Err(error.into())
            }
            Ok((_, Err(join))) | Err(join) => Err(NetworkError::unknown(join)),
        }
    }

    /// Fetch and parse as a JSON object.
    pub async fn json_object(&self, mock: &dyn Mock) -> Result<JsonObject, NetworkError> {
        match parse_json(&self.fetch_bytes(mock).await?)? {
            Value::Object(object) => Ok(object),
            other => Err(shape_mismatch("an object", &other)),
        }
    }

    /// Fetch and parse as a JSON array.
    pub async fn json_array(&self, mock: &dyn Mock) -> Result<JsonArray, NetworkError> {
        match parse_json(&self.fetch_bytes(mock).await?)? {
            Value::Array(array) => Ok(array),
            other => Err(shape_mismatch("an array", &other)),
        }
    }

    /// Fetch and decode into `T` with the configured [`Decoder`].
    pub async fn decoded<T: DeserializeOwned>(&self, mock: &dyn Mock) -> Result<T, NetworkError> {
        let bytes = self.fetch_bytes(mock).await?;
        self.decoder.decode(&bytes)
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, NetworkError> {
    serde_json::from_slice(bytes)
        .map_err(|e| MockError::Deserialization(format!("error deserializing json: {}", e)).into())
}

fn shape_mismatch(expected: &str, found: &Value) -> NetworkError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    MockError::Deserialization(format!(
        "could not deserialize json for the given type: expected {}, found {}",
        expected, found
    ))
    .into()
}
