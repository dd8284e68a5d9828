//! Test error types.

use fastpoint_core::RequestError;
use thiserror::Error;

/// Errors that can occur while building or dispatching a test request.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// Header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed.
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// The raw request could not be turned into a Fastpoint request.
    #[error("Request processing error: {0}")]
    Request(#[from] RequestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TestError::InvalidHeader("bad name".to_string());
        assert_eq!(err.to_string(), "Invalid header: bad name");

        let err = TestError::RequestBuild("Invalid URI".to_string());
        assert_eq!(err.to_string(), "Request build error: Invalid URI");
    }
}
