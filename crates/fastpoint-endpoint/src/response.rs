//! Response schemas.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use fastpoint_core::{ErrorResponse, Request, ResponseHandle};
use fastpoint_extract::{Schema, Serializer, Validator};

use crate::extensions::{ErrorCause, Extensions};

/// Post-handler step that filters response data through a schema.
///
/// Undeclared properties are dropped, so a schema doubles as an allow-list of
/// what leaves the server.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    schema: Arc<Schema>,
}

impl ResponseSchema {
    /// Wraps `schema`.
    #[must_use]
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self { schema: schema.into() }
    }

    /// The schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates and serializes the response data in place.
    ///
    /// Returns the error to send instead, if any.
    pub fn apply(
        &self,
        request: &Request,
        response: &ResponseHandle,
        extensions: &dyn Extensions,
        validator: Arc<dyn Validator>,
        serializer: Arc<dyn Serializer>,
    ) -> Option<ErrorResponse> {
        let snapshot = response.snapshot();
        let data = extensions.response_data(snapshot.data().clone(), &snapshot, request);
        if !matches!(data, Value::Array(_) | Value::Object(_)) {
            let error = ErrorResponse::internal(format!(
                "Invalid response data. Expected 'array' or 'object' but {} given.",
                type_name(&data)
            ));
            return Some(extensions.response_error(error, ErrorCause::UnexpectedData(&data), &snapshot, request));
        }

        let validator = extensions.response_validator(validator, request, &snapshot);
        let serializer = extensions.response_serializer(serializer, request, &snapshot);

        let valid = match validator.validate("response", &data, &self.schema) {
            Ok(valid) => valid,
            Err(violations) => {
                debug!(violations = violations.len(), "response rejected by schema");
                let mut details = Map::new();
                details.insert(
                    "errors".to_string(),
                    serde_json::to_value(&violations).unwrap_or(Value::Null),
                );
                let error = ErrorResponse::with_data(500, "Invalid response", details);
                let cause = ErrorCause::InvalidResponse(&violations);
                return Some(extensions.response_error(error, cause, &snapshot, request));
            }
        };

        match serializer.serialize(valid) {
            Ok(serialized) => {
                response.lock().set_data(serialized);
                None
            }
            Err(err) => {
                let error = ErrorResponse::internal(format!("Unable to serialize response due to {}", err.reason));
                Some(extensions.response_error(error, ErrorCause::Serialize(&err), &snapshot, request))
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::NoExtensions;
    use fastpoint_core::Response;
    use fastpoint_extract::{DefaultValidator, JsonSerializer, SerializeError};
    use http::Method;
    use serde_json::json;

    fn post_schema() -> ResponseSchema {
        ResponseSchema::new(Schema::object(vec![
            ("id", Schema::integer().required()),
            ("title", Schema::string()),
        ]))
    }

    fn apply(schema: &ResponseSchema, data: Value) -> (Option<ErrorResponse>, Value) {
        let request = Request::new(Method::GET, "/");
        let response = ResponseHandle::new(Response::json(data));
        let error = schema.apply(
            &request,
            &response,
            &NoExtensions,
            Arc::new(DefaultValidator::new()),
            Arc::new(JsonSerializer::new()),
        );
        (error, response.snapshot().data().clone())
    }

    #[test]
    fn test_drops_undeclared_properties() {
        let (error, data) = apply(&post_schema(), json!({"id": 1, "title": "Hi", "password": "secret"}));
        assert!(error.is_none());
        assert_eq!(data, json!({"id": 1, "title": "Hi"}));
    }

    #[test]
    fn test_rejects_scalar_data() {
        let (error, _) = apply(&post_schema(), json!("text"));
        let error = error.expect("scalar rejected");
        assert_eq!(error.status(), 500);
        assert_eq!(
            error.message(),
            "Invalid response data. Expected 'array' or 'object' but string given."
        );
    }

    #[test]
    fn test_reports_schema_violations() {
        let (error, data) = apply(&post_schema(), json!({"title": "No id"}));
        let error = error.expect("invalid response");
        assert_eq!(error.message(), "Invalid response");
        assert_eq!(error.data()["errors"][0]["field"], json!("response.id"));
        // The response is left untouched.
        assert_eq!(data, json!({"title": "No id"}));
    }

    struct Failing;

    impl Serializer for Failing {
        fn serialize(&self, _value: Value) -> Result<Value, SerializeError> {
            Err(SerializeError::new("a closed resource"))
        }
    }

    #[test]
    fn test_serializer_failure() {
        let request = Request::new(Method::GET, "/");
        let response = ResponseHandle::new(Response::json(json!({"id": 1})));
        let error = post_schema()
            .apply(
                &request,
                &response,
                &NoExtensions,
                Arc::new(DefaultValidator::new()),
                Arc::new(Failing),
            )
            .expect("serializer failure");
        assert_eq!(error.message(), "Unable to serialize response due to a closed resource");
    }
}
