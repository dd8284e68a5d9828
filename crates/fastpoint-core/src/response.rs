//! Responses and the per-request response handle.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

/// A response returned to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    data: Value,
    headers: HeaderMap,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an empty `200` response with `null` data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            data: Value::Null,
            headers: HeaderMap::new(),
        }
    }

    /// Creates a `200` response carrying `data`.
    #[must_use]
    pub fn json(data: impl Into<Value>) -> Self {
        Self::new().with_data(data)
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets a header, replacing earlier values.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the data.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replaces the status.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Replaces the data.
    pub fn set_data(&mut self, data: impl Into<Value>) {
        self.data = data.into();
    }

    /// Sets a header, replacing earlier values.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }
}

/// Shared, mutable handle to the response of the request being served.
///
/// Every phase of a request sees the same handle, so a status set by a
/// pre-handler is still there when the main handler's data is attached.
#[derive(Clone, Default)]
pub struct ResponseHandle(Arc<Mutex<Response>>);

impl ResponseHandle {
    /// Wraps a response.
    #[must_use]
    pub fn new(response: Response) -> Self {
        Self(Arc::new(Mutex::new(response)))
    }

    /// Locks the response for reading or writing.
    pub fn lock(&self) -> MutexGuard<'_, Response> {
        self.0.lock()
    }

    /// Returns a copy of the current response.
    #[must_use]
    pub fn snapshot(&self) -> Response {
        self.0.lock().clone()
    }

    /// Returns `true` if both handles point at the same response.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResponseHandle").field(&*self.0.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_defaults() {
        let response = Response::new();
        assert_eq!(response.status(), 200);
        assert_eq!(response.data(), &Value::Null);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = ResponseHandle::new(Response::new());
        let clone = handle.clone();
        clone.lock().set_status(201);
        clone.lock().set_data(json!({"id": 1}));

        assert!(handle.ptr_eq(&clone));
        assert_eq!(handle.snapshot(), Response::json(json!({"id": 1})).with_status(201));
    }
}
