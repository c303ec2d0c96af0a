//! Error types for the gallus knowledge base core.

use thiserror::Error;

/// Result type alias using gallus's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gallus operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (broken rule table, bad endpoint, missing model).
    /// Fatal at service startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A finished metadata record violated a schema invariant.
    /// Fatal for the affected document; the document is quarantined.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad rule table".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad rule table");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_invariant() {
        let err = Error::Invariant("org_internal without owner".to_string());
        assert_eq!(
            err.to_string(),
            "Invariant violation: org_internal without owner"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_serde_yaml_error_is_config() {
        let yaml_err = serde_yaml::from_str::<i32>("[not an int").unwrap_err();
        let err: Error = yaml_err.into();
        match err {
            Error::Config(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "rules.yaml not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
