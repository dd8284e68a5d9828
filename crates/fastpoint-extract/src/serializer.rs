use serde_json::Value;
use thiserror::Error;

/// Error raised when a value cannot be turned into a response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct SerializeError {
    /// Why serialization failed.
    pub reason: String,
}

impl SerializeError {
    /// Creates a serialization error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turns a validated value into the shape sent to the client.
pub trait Serializer: Send + Sync {
    /// Serializes `value`.
    fn serialize(&self, value: Value) -> Result<Value, SerializeError>;
}

/// The default [`Serializer`]: JSON values pass through, optionally without `null` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer {
    skip_nulls: bool,
}

impl JsonSerializer {
    /// Creates a pass-through serializer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops object fields whose value is `null`, recursively.
    #[must_use]
    pub const fn skip_nulls(mut self) -> Self {
        self.skip_nulls = true;
        self
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, value: Value) -> Result<Value, SerializeError> {
        if self.skip_nulls {
            return Ok(strip_nulls(value));
        }
        Ok(value)
    }
}
