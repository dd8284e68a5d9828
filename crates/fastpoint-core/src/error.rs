//! Error types for Fastpoint.
//!
//! Two families live here:
//!
//! - [`ErrorResponse`] is the error-shaped value handed back to the host. It always
//!   serializes as `{"code": N, "message": "...", "data": {"status": N, ...}}`.
//! - [`ResolutionError`] is raised while building a handler's argument list. It is
//!   fatal for the current phase and converts into an [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Message used when an error is built from an empty list of messages.
const NO_DESCRIPTION: &str = "No error description provided";

/// A single violated field, reported under `data.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field (the parameter name as seen by the client).
    pub field: String,
    /// Why the field was rejected.
    pub reason: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates the error reported when a required argument has no value.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let reason = format!("Missing required argument '{field}'");
        Self { field, reason }
    }
}

/// Error-shaped value returned to the host.
///
/// # Example
///
/// ```
/// use fastpoint_core::ErrorResponse;
///
/// let error = ErrorResponse::new(570, "Exception handler");
/// assert_eq!(
///     error.to_json(),
///     serde_json::json!({"code": 570, "message": "Exception handler", "data": {"status": 570}})
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct ErrorResponse {
    code: u16,
    message: String,
    data: Map<String, Value>,
}

impl ErrorResponse {
    /// Creates an error with the given HTTP status and message.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self::with_data(status, message, Map::new())
    }

    /// Creates an error carrying extra data. `status` is always merged into the data.
    #[must_use]
    pub fn with_data(status: u16, message: impl Into<String>, mut data: Map<String, Value>) -> Self {
        data.insert("status".to_string(), Value::from(status));
        Self {
            code: status,
            message: message.into(),
            data,
        }
    }

    /// Creates an error from a list of messages.
    ///
    /// The first message becomes the error message and the whole list is kept
    /// under `data.all_messages`.
    #[must_use]
    pub fn from_messages<I, S>(status: u16, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        let Some(first) = messages.first().cloned() else {
            return Self::new(status, NO_DESCRIPTION);
        };
        let mut data = Map::new();
        data.insert("all_messages".to_string(), Value::from(messages));
        Self::with_data(status, first, data)
    }

    /// Creates the 422 "Invalid data" error listing every violated field.
    #[must_use]
    pub fn invalid_data(errors: Vec<FieldError>) -> Self {
        let errors: Vec<Value> = errors
            .into_iter()
            .map(|e| serde_json::json!({"field": e.field, "reason": e.reason}))
            .collect();
        let mut data = Map::new();
        data.insert("errors".to_string(), Value::Array(errors));
        Self::with_data(422, "Invalid data", data)
    }

    /// Creates a 500 error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// Creates a 403 error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    /// Adds (or replaces) a key in the error data. `status` cannot be replaced.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "status" {
            self.data.insert(key, value.into());
        }
        self
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.code
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error data, which always contains `status`.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns the JSON payload sent to the client.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
            "data": Value::Object(self.data.clone()),
        })
    }
}

/// Failure while building a handler's argument list.
///
/// Resolution errors never reach exception handlers: they end the current phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// An injected parameter names an entry that is not registered.
    #[error("Injectable not found for parameter {parameter} in route {route}")]
    MissingInjectable {
        /// The handler parameter asking for the injectable.
        parameter: String,
        /// Full route of the endpoint being served.
        route: String,
    },

    /// An injectable resolver transitively required itself.
    #[error("Infinite injectables loop in route {route}")]
    InjectableCycle {
        /// The injectable that was re-entered.
        name: String,
        /// Full route of the endpoint being served.
        route: String,
    },

    /// One or more parameters are missing or failed coercion.
    #[error("Invalid data")]
    InvalidData {
        /// Every violated field, in parameter order.
        errors: Vec<FieldError>,
    },
}

impl ResolutionError {
    /// Returns the HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidData { .. } => 422,
            Self::MissingInjectable { .. } | Self::InjectableCycle { .. } => 500,
        }
    }
}

impl From<ResolutionError> for ErrorResponse {
    fn from(error: ResolutionError) -> Self {
        match error {
            ResolutionError::InvalidData { errors } => Self::invalid_data(errors),
            other => Self::new(other.status(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response_shape() {
        let error = ErrorResponse::new(500, "Something went wrong");
        assert_eq!(error.status(), 500);
        assert_eq!(
            error.to_json(),
            json!({"code": 500, "message": "Something went wrong", "data": {"status": 500}})
        );
    }

    #[test]
    fn test_status_is_merged_into_data() {
        let mut data = Map::new();
        data.insert("status".to_string(), json!(200));
        data.insert("hint".to_string(), json!("retry"));
        let error = ErrorResponse::with_data(418, "teapot", data);
        assert_eq!(error.data()["status"], 418);
        assert_eq!(error.data()["hint"], "retry");
    }

    #[test]
    fn test_from_messages() {
        let error = ErrorResponse::from_messages(400, ["first", "second"]);
        assert_eq!(error.message(), "first");
        assert_eq!(error.data()["all_messages"], json!(["first", "second"]));

        let empty = ErrorResponse::from_messages(400, Vec::<String>::new());
        assert_eq!(empty.message(), "No error description provided");
    }

    #[test]
    fn test_invalid_data_payload() {
        let error = ErrorResponse::invalid_data(vec![FieldError::missing("missingField")]);
        assert_eq!(
            error.to_json(),
            json!({
                "code": 422,
                "message": "Invalid data",
                "data": {
                    "status": 422,
                    "errors": [{
                        "field": "missingField",
                        "reason": "Missing required argument 'missingField'"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_with_detail_keeps_status() {
        let error = ErrorResponse::forbidden("nope")
            .with_detail("status", 200)
            .with_detail("capability", "edit_posts");
        assert_eq!(error.data()["status"], 403);
        assert_eq!(error.data()["capability"], "edit_posts");
    }

    #[test]
    fn test_resolution_error_messages() {
        let missing = ResolutionError::MissingInjectable {
            parameter: "user".to_string(),
            route: "/api/v1/users".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Injectable not found for parameter user in route /api/v1/users"
        );
        assert_eq!(missing.status(), 500);

        let cycle = ResolutionError::InjectableCycle {
            name: "a".to_string(),
            route: "/api/v1/loop".to_string(),
        };
        let response = ErrorResponse::from(cycle);
        assert_eq!(response.status(), 500);
        assert_eq!(response.message(), "Infinite injectables loop in route /api/v1/loop");
    }
}
