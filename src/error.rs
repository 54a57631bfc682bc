//! Error types for mocked and real requests.
//!
//! [`NetworkError`] is the taxonomy every [`NetworkClient`](crate::NetworkClient)
//! reports, mocked or not. [`MockError`] describes why a mock could not
//! produce its response; it reaches callers wrapped in
//! [`NetworkError::Unknown`].

use thiserror::Error;

/// Boxed error cause carried by [`NetworkError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a network request.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(#[source] BoxError),

    /// Any other failure, wrapping its cause
    #[error("Unknown error: {0}")]
    Unknown(#[source] BoxError),
}

impl NetworkError {
    /// Wrap any error as [`NetworkError::Unknown`].
    pub fn unknown(cause: impl Into<BoxError>) -> Self {
        NetworkError::Unknown(cause.into())
    }

    /// Wrap a decoder failure as [`NetworkError::Decode`].
    pub fn decode(cause: impl Into<BoxError>) -> Self {
        NetworkError::Decode(cause.into())
    }

    /// The mock-side cause, if this error came out of a mock.
    pub fn mock_cause(&self) -> Option<&MockError> {
        match self {
            NetworkError::Unknown(cause) | NetworkError::Decode(cause) => {
                cause.downcast_ref::<MockError>()
            }
            _ => None,
        }
    }

    /// Whether this is a decode-kind failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, NetworkError::Decode(_))
    }

    /// Whether this is an unknown-kind failure.
    pub fn is_unknown(&self) -> bool {
        matches!(self, NetworkError::Unknown(_))
    }
}

impl From<MockError> for NetworkError {
    fn from(error: MockError) -> Self {
        NetworkError::Unknown(Box::new(error))
    }
}

/// Why a mock could not produce bytes.
///
/// Every message is labeled as coming from a mock so a failing test points
/// at its fixtures rather than at a server.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("Mocked response: didn't find {name}.{extension} in bundle {bundle}")]
    SourceNotFound {
        bundle: String,
        name: String,
        extension: String,
    },

    #[error("Mocked response: failed to read {location}: {source}")]
    Read {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Mocked response: cannot serialize value: {0}")]
    Serialization(String),

    #[error("Mocked response: text is not representable as {encoding}")]
    Unencodable { encoding: &'static str },

    #[error("Mocked response: {0}")]
    Deserialization(String),

    #[error("Mocked response: injected failure: {0}")]
    Injected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_error_becomes_unknown() {
        let err: NetworkError = MockError::Injected("boom".to_string()).into();
        assert!(err.is_unknown());
        assert!(matches!(err.mock_cause(), Some(MockError::Injected(reason)) if reason == "boom"));
    }

    #[test]
    fn test_mock_cause_absent_for_transport() {
        let err = NetworkError::Transport("offline".to_string());
        assert!(err.mock_cause().is_none());
        assert_eq!(err.to_string(), "Transport error: offline");
    }

    #[test]
    fn test_source_not_found_display() {
        let err = MockError::SourceNotFound {
            bundle: "fixtures".to_string(),
            name: "user".to_string(),
            extension: "json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mocked response: didn't find user.json in bundle fixtures"
        );
    }
}
