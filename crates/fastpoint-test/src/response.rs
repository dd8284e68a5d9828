//! Test response wrapper.

use fastpoint_core::{ErrorResponse, Response};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// The outcome of a dispatched test request, as a client would see it.
///
/// Successful responses carry the handler's data as body. Errors carry the
/// `{code, message, data}` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Value) -> Self {
        Self { status, headers, body }
    }

    /// Converts the result of an endpoint callback.
    pub fn from_result(result: Result<Response, ErrorResponse>) -> Self {
        match result {
            Ok(response) => Self::from_response(&response),
            Err(error) => Self::from_error(&error),
        }
    }

    /// Converts a successful response.
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: status_of(response.status()),
            headers: response.headers().clone(),
            body: response.data().clone(),
        }
    }

    /// Converts an error response.
    pub fn from_error(error: &ErrorResponse) -> Self {
        Self {
            status: status_of(error.status()),
            headers: HeaderMap::new(),
            body: error.to_json(),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Returns true if the status is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the JSON body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the body serialized as a string.
    #[must_use]
    pub fn text(&self) -> String {
        self.body.to_string()
    }

    /// Deserializes the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Returns the `message` of an error body.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(self.status, expected, "Expected status {}, got {} with body {}", expected, self.status, self.body);
        self
    }

    /// Asserts that the status code equals the expected u16 value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "Expected status {}, got {} with body {}",
            expected,
            self.status.as_u16(),
            self.body
        );
        self
    }

    /// Asserts that the response is successful (2xx).
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(self.is_success(), "Expected success status, got {} with body {}", self.status, self.body);
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, expected, "Header '{}': expected '{}', got '{}'", name, expected, actual);
        self
    }

    /// Asserts that the body equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't match.
    pub fn assert_json(&self, expected: &Value) -> &Self {
        assert_eq!(&self.body, expected, "Body mismatch");
        self
    }

    /// Asserts that the body is an error with the given code and message.
    ///
    /// # Panics
    ///
    /// Panics if the status, `code` or `message` differ.
    pub fn assert_error(&self, code: u16, message: impl AsRef<str>) -> &Self {
        self.assert_status_code(code);
        assert_eq!(self.body.get("code"), Some(&Value::from(code)), "Error code mismatch in {}", self.body);
        assert_eq!(self.error_message(), Some(message.as_ref()), "Error message mismatch in {}", self.body);
        self
    }
}

// Statuses outside 100..=999 cannot be represented; report them as 500.
fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body() {
        let response = TestResponse::from_error(&ErrorResponse::new(570, "Exception handler"));
        response.assert_error(570, "Exception handler");
        response.assert_json(&json!({"code": 570, "message": "Exception handler", "data": {"status": 570}}));
        assert!(response.is_server_error());
    }

    #[test]
    fn test_success_body() {
        let response = TestResponse::from_result(Ok(Response::json(json!({"id": 5})).with_status(201)));
        response.assert_status(StatusCode::CREATED).assert_success();

        #[derive(serde::Deserialize)]
        struct Post {
            id: u32,
        }
        assert_eq!(response.json::<Post>().unwrap().id, 5);
        assert_eq!(response.text(), r#"{"id":5}"#);
    }
}
