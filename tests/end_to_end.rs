//! End-to-end behavior of the mocking decorator over a recording client.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use zentinel_mock_http_client::{
    BundleReadStrategy, ClientSettings, CompareOverrideStrategy, DataReadStrategy, Decoder,
    DirectoryBundle, JsonArray, JsonObject, LimitedOverrideStrategy, Mock, MockError,
    MockHttpClient, NetworkClient, NetworkError, NetworkRequest, PredicateOverrideStrategy,
    ReadStrategy, ResourceBundle, RotatingMock, SingleMock, TextEncoding, UrlReadStrategy,
};

/// Stands in for the real network and records every request it receives.
#[derive(Default)]
struct RecordingClient {
    requests: Mutex<Vec<NetworkRequest>>,
}

impl RecordingClient {
    fn requests(&self) -> Vec<NetworkRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: &NetworkRequest) -> Bytes {
        self.requests.lock().unwrap().push(request.clone());
        Bytes::from(format!(r#"{{"served_by":"network","path":"{}"}}"#, request.path))
    }
}

#[async_trait]
impl NetworkClient for RecordingClient {
    async fn request_bytes(&self, request: &NetworkRequest) -> Result<Bytes, NetworkError> {
        Ok(self.respond(request))
    }

    async fn request_json_object(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonObject, NetworkError> {
        serde_json::from_slice(&self.respond(request)).map_err(NetworkError::decode)
    }

    async fn request_json_array(
        &self,
        request: &NetworkRequest,
    ) -> Result<JsonArray, NetworkError> {
        serde_json::from_slice(&self.respond(request)).map_err(NetworkError::decode)
    }

    async fn request_decoded<T>(&self, request: &NetworkRequest) -> Result<T, NetworkError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        serde_json::from_slice(&self.respond(request)).map_err(NetworkError::decode)
    }
}

#[tokio::test]
async fn test_mocked_user_and_passthrough() {
    let mock = SingleMock::for_request(
        NetworkRequest::get("/users/1"),
        Arc::new(DataReadStrategy::new(r#"{"id":1}"#)),
    );
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(mock)],
    );

    let user = client
        .request_json_object(&NetworkRequest::get("/users/1"))
        .await
        .unwrap();
    assert_eq!(Value::Object(user), json!({"id": 1}));

    let other = client
        .request_json_object(&NetworkRequest::get("/users/2"))
        .await
        .unwrap();
    assert_eq!(other["served_by"], "network");
    assert_eq!(
        client.network().requests(),
        vec![NetworkRequest::get("/users/2")]
    );
}

#[tokio::test]
async fn test_json_value_round_trip() {
    let value = json!([{"id": 1, "tags": ["a"]}, {"id": 2, "tags": []}]);
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(SingleMock::for_request(
            NetworkRequest::get("/users"),
            Arc::new(DataReadStrategy::from_json(&value).unwrap()),
        ))],
    );

    let array = client
        .request_json_array(&NetworkRequest::get("/users"))
        .await
        .unwrap();
    assert_eq!(Value::Array(array), value);
}

#[tokio::test]
async fn test_text_round_trip() {
    let text = "Grüße, 世界";
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(SingleMock::for_request(
            NetworkRequest::get("/greeting"),
            Arc::new(DataReadStrategy::from_text(text, TextEncoding::Utf16Be).unwrap()),
        ))],
    );

    let bytes = client
        .request_bytes(&NetworkRequest::get("/greeting"))
        .await
        .unwrap();
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(String::from_utf16(&units).unwrap(), text);
}

#[tokio::test]
async fn test_rotation_and_delay() {
    let strategies = ["pending", "pending", "done"]
        .into_iter()
        .map(|state| {
            Arc::new(DataReadStrategy::from_json(&json!({ "state": state })).unwrap())
                as Arc<dyn ReadStrategy>
        })
        .collect();
    let mock = RotatingMock::for_request(NetworkRequest::get("/jobs/42"), strategies)
        .with_delay(Duration::from_millis(20));
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(mock)],
    );

    #[derive(Deserialize)]
    struct Job {
        state: String,
    }

    let start = Instant::now();
    let mut states = Vec::new();
    for _ in 0..4 {
        let job: Job = client
            .request_decoded(&NetworkRequest::get("/jobs/42"))
            .await
            .unwrap();
        states.push(job.state);
    }
    assert!(start.elapsed() >= Duration::from_millis(80));
    assert_eq!(states, ["pending", "pending", "done", "pending"]);
    assert!(client.network().requests().is_empty());
}

#[tokio::test]
async fn test_missing_fixture_is_an_error_not_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let bundle: Arc<dyn ResourceBundle> = Arc::new(DirectoryBundle::new(dir.path()));
    let mock = SingleMock::for_request(
        NetworkRequest::get("/missing"),
        Arc::new(BundleReadStrategy::json(bundle.clone(), "nowhere")),
    );
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(mock)],
    );

    let err = client
        .request_bytes(&NetworkRequest::get("/missing"))
        .await
        .unwrap_err();
    assert!(err.is_unknown());
    assert!(matches!(
        err.mock_cause(),
        Some(MockError::SourceNotFound { name, .. }) if name == "nowhere"
    ));

    assert!(UrlReadStrategy::json_in_bundle(bundle.as_ref(), "nowhere").is_err());
}

#[tokio::test]
async fn test_decode_mismatch_and_garbage() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct User {
        id: u32,
    }

    let mocks: Vec<Arc<dyn Mock>> = vec![
        Arc::new(SingleMock::for_request(
            NetworkRequest::get("/wrong-shape"),
            Arc::new(DataReadStrategy::new(r#"["not","a","user"]"#)),
        )),
        Arc::new(SingleMock::for_request(
            NetworkRequest::get("/garbage"),
            Arc::new(DataReadStrategy::new("<html>oops</html>")),
        )),
    ];
    let client = MockHttpClient::new(Handle::current(), RecordingClient::default(), mocks);

    let err = client
        .request_decoded::<User>(&NetworkRequest::get("/wrong-shape"))
        .await
        .unwrap_err();
    assert!(err.is_decode());

    let err = client
        .request_decoded::<User>(&NetworkRequest::get("/garbage"))
        .await
        .unwrap_err();
    assert!(err.is_decode() || err.is_unknown());
}

#[tokio::test]
async fn test_demo_settings_and_fixtures() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/default-config.yaml");
    let settings = ClientSettings::from_file(&path).unwrap();
    assert_eq!(settings.decoder, Decoder::Json);

    let fixtures: Arc<dyn ResourceBundle> = Arc::new(settings.fixtures());
    let mock = SingleMock::new(
        Arc::new(BundleReadStrategy::json(fixtures, "user")),
        Arc::new(PredicateOverrideStrategy::new(|request: &NetworkRequest| {
            request.method == "GET" && request.path.starts_with("/users/")
        })),
    )
    .with_name("user-by-id");
    let client = MockHttpClient::with_settings(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(mock)],
        settings,
    );

    let grace = client
        .request_json_object(&NetworkRequest::get("/users/2"))
        .await
        .unwrap();
    assert_eq!(grace["name"], "Grace");

    // Not a mocked route
    let posts = client
        .request_json_array(&NetworkRequest::get("/posts"))
        .await;
    assert!(posts.is_err());
    assert_eq!(client.network().requests(), vec![NetworkRequest::get("/posts")]);
}

#[tokio::test]
async fn test_match_limit_falls_through_to_network() {
    let token = SingleMock::new(
        Arc::new(DataReadStrategy::from_json(&json!({"token": "abc"})).unwrap()),
        Arc::new(LimitedOverrideStrategy::new(
            Arc::new(CompareOverrideStrategy::new(NetworkRequest::post("/token"))),
            1,
        )),
    );
    let client = MockHttpClient::new(
        Handle::current(),
        RecordingClient::default(),
        vec![Arc::new(token)],
    );

    assert!(client.find_mock(&NetworkRequest::post("/token")).is_some());

    let first = client
        .request_json_object(&NetworkRequest::post("/token"))
        .await
        .unwrap();
    assert_eq!(first["token"], "abc");

    let second = client
        .request_json_object(&NetworkRequest::post("/token"))
        .await
        .unwrap();
    assert_eq!(second["served_by"], "network");
    assert_eq!(client.network().requests().len(), 1);
}
