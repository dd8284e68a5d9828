use serde_json::{Map, Value};

use fastpoint_core::FieldError;

use crate::descriptor::{BuiltinType, ParamType};
use crate::schema::{self, Coercion, Schema};

/// Turns raw parameter values into their declared types.
///
/// Implementations must be cheap to share: one instance serves every request
/// of every endpoint it is registered on.
pub trait Validator: Send + Sync {
    /// Coerces `value` into `ty`, reporting violations against `field`.
    fn coerce(&self, field: &str, value: &Value, ty: &ParamType) -> Result<Value, Vec<FieldError>>;

    /// Coerces `value` into the shape described by `schema`.
    fn validate(&self, field: &str, value: &Value, schema: &Schema) -> Result<Value, Vec<FieldError>>;
}

/// The default [`Validator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultValidator {
    mode: Coercion,
}

impl DefaultValidator {
    /// Creates a validator with lenient coercion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that only accepts values of the exact type.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            mode: Coercion::Strict,
        }
    }

    /// Creates a validator with the given coercion mode.
    #[must_use]
    pub const fn with_mode(mode: Coercion) -> Self {
        Self { mode }
    }

    /// Returns the coercion mode.
    #[must_use]
    pub const fn mode(&self) -> Coercion {
        self.mode
    }

    fn coerce_builtin(&self, value: &Value, ty: BuiltinType) -> Result<Value, String> {
        match ty {
            BuiltinType::Int => schema::to_integer(value, self.mode).map(Value::from),
            BuiltinType::Float => schema::to_number(value, self.mode).and_then(|n| {
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| format!("value {n} is not a finite number"))
            }),
            BuiltinType::Bool => schema::to_bool(value, self.mode).map(Value::Bool),
            BuiltinType::String => schema::to_string(value, self.mode).map(Value::String),
            BuiltinType::Array => match value {
                Value::Array(_) | Value::Object(_) => Ok(value.clone()),
                _ => Err(schema::expected("array", value)),
            },
            BuiltinType::Object => match value {
                Value::Object(_) => Ok(value.clone()),
                Value::Array(items) if self.mode == Coercion::Lenient => Ok(Value::Object(
                    items
                        .iter()
                        .enumerate()
                        .map(|(idx, item)| (idx.to_string(), item.clone()))
                        .collect::<Map<_, _>>(),
                )),
                _ => Err(schema::expected("object", value)),
            },
            BuiltinType::Mixed => Ok(value.clone()),
            BuiltinType::Null => match value {
                Value::Null => Ok(Value::Null),
                _ => Err(schema::expected("null", value)),
            },
        }
    }
}

impl Validator for DefaultValidator {
    fn coerce(&self, field: &str, value: &Value, ty: &ParamType) -> Result<Value, Vec<FieldError>> {
        match ty {
            ParamType::Builtin(builtin) => self
                .coerce_builtin(value, *builtin)
                .map_err(|reason| vec![FieldError::new(field, reason)]),
            ParamType::Class(schema) => self.validate(field, value, schema),
            ParamType::Context(kind) => Err(vec![FieldError::new(
                field,
                schema::expected(kind.well_known_name(), value),
            )]),
        }
    }

    fn validate(&self, field: &str, value: &Value, schema: &Schema) -> Result<Value, Vec<FieldError>> {
        schema.coerce(field, value, self.mode)
    }
}
