//! Domain error types
//!
//! This module defines the error hierarchy for es-sample.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main es-sample error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// Output sink errors
    #[error("Output error: {0}")]
    Output(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was cancelled by a shutdown signal
    #[error("Interrupted by shutdown signal")]
    Interrupted,

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SampleError {
    /// Whether the error was caused by the remote store being unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, SampleError::Store(StoreError::ConnectionFailed { .. }))
    }
}

/// Document store errors
///
/// Errors that occur when talking to the search-index HTTP API.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The host URL or a request path could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to connect to the store
    #[error("Failed to connect to {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// The connection broke while a request was in flight
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("{status} {reason} - {url}: {body}")]
    Status {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    /// Response body carried an application-level error
    #[error("Request to {url} failed: {body}")]
    Application { url: String, body: String },

    /// Response body was missing expected fields
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for SampleError {
    fn from(err: std::io::Error) -> Self {
        SampleError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SampleError {
    fn from(err: serde_json::Error) -> Self {
        SampleError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SampleError {
    fn from(err: toml::de::Error) -> Self {
        SampleError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_error_display() {
        let err = SampleError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::ConnectionFailed {
            url: "http://localhost:9200/".to_string(),
            message: "refused".to_string(),
        };
        let err: SampleError = store_err.into();
        assert!(matches!(err, SampleError::Store(_)));
        assert!(err.is_connection());
    }

    #[test]
    fn test_status_error_names_request() {
        let err = StoreError::Status {
            status: 404,
            reason: "Not Found".to_string(),
            url: "http://localhost:9200/missing/_search".to_string(),
            body: "{}".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("404 Not Found"));
        assert!(message.contains("/missing/_search"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SampleError = io_err.into();
        assert!(matches!(err, SampleError::Io(_)));
        assert!(!err.is_connection());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SampleError = json_err.into();
        assert!(matches!(err, SampleError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SampleError = toml_err.into();
        assert!(matches!(err, SampleError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
