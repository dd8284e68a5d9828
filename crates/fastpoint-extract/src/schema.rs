//! Schemas for class-shaped parameters and response bodies.
//!
//! A [`Schema`] both validates and coerces JSON. Coercion follows the
//! [`Coercion`] mode: lenient coercion turns `"42"` into `42` for an integer
//! field, strict coercion rejects it. Object schemas drop properties they do not
//! declare, which is what keeps response bodies limited to their documented
//! shape.
//!
//! # Example
//!
//! ```
//! use fastpoint_extract::{Coercion, Schema};
//! use serde_json::json;
//!
//! let post = Schema::object(vec![
//!     ("id", Schema::integer().required()),
//!     ("title", Schema::string().min_length(1).required()),
//!     ("tags", Schema::array(Schema::string())),
//! ])
//! .titled("Post");
//!
//! let coerced = post
//!     .coerce("post", &json!({"id": "7", "title": "Hello", "secret": true}), Coercion::Lenient)
//!     .unwrap();
//! assert_eq!(coerced, json!({"id": 7, "title": "Hello"}));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use fastpoint_core::FieldError;

/// How far coercion may go when a value does not already have the expected type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    /// Convert between strings, numbers and booleans where unambiguous.
    #[default]
    Lenient,
    /// Only accept values that already have the expected type.
    Strict,
}

/// Type-specific part of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaKind {
    /// String.
    String {
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Integer.
    Integer {
        /// Minimum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Maximum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Number.
    Number {
        /// Minimum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Maximum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// Boolean.
    Boolean,
    /// Array.
    Array {
        /// Schema of every item.
        items: Box<Schema>,
        /// Minimum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// Object with declared properties.
    Object {
        /// Properties in declaration order.
        #[serde(default)]
        properties: IndexMap<String, Schema>,
    },
    /// Anything.
    Any,
    /// `null` only.
    Null,
}

/// A JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type-specific constraints.
    #[serde(flatten)]
    pub kind: SchemaKind,
    /// Whether the property must be present (object properties only).
    #[serde(default)]
    pub required: bool,
    /// Value used when an optional property is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable name, used in error messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            title: None,
        }
    }

    /// String schema.
    #[must_use]
    pub fn string() -> Self {
        Self::of(SchemaKind::String {
            min_length: None,
            max_length: None,
        })
    }

    /// Integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer {
            minimum: None,
            maximum: None,
        })
    }

    /// Number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::of(SchemaKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// Boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    /// Array schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::of(SchemaKind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    /// Object schema from `(name, schema)` pairs.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        Self::of(SchemaKind::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
        })
    }

    /// Schema accepting anything.
    #[must_use]
    pub fn any() -> Self {
        Self::of(SchemaKind::Any)
    }

    /// Schema accepting only `null`.
    #[must_use]
    pub fn null() -> Self {
        Self::of(SchemaKind::Null)
    }

    /// Marks the schema as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when the property is absent.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Names the schema.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the schema name, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Sets the minimum length of a string schema.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let SchemaKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum length of a string schema.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let SchemaKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the minimum of an integer schema.
    #[must_use]
    pub fn minimum_int(mut self, min: i64) -> Self {
        if let SchemaKind::Integer { minimum, .. } = &mut self.kind {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the maximum of an integer schema.
    #[must_use]
    pub fn maximum_int(mut self, max: i64) -> Self {
        if let SchemaKind::Integer { maximum, .. } = &mut self.kind {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum number of items of an array schema.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let SchemaKind::Array { min_items, .. } = &mut self.kind {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum number of items of an array schema.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let SchemaKind::Array { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }

    /// Coerces `value` into the shape of this schema.
    ///
    /// All violations are collected; `field` prefixes every reported path.
    pub fn coerce(&self, field: &str, value: &Value, mode: Coercion) -> Result<Value, Vec<FieldError>> {
        let mut errors = Vec::new();
        let coerced = self.coerce_at(value, field, mode, &mut errors);
        match coerced {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    /// Checks `value` without lenient conversions.
    pub fn validate(&self, field: &str, value: &Value) -> Result<(), Vec<FieldError>> {
        self.coerce(field, value, Coercion::Strict).map(|_| ())
    }

    fn coerce_at(
        &self,
        value: &Value,
        path: &str,
        mode: Coercion,
        errors: &mut Vec<FieldError>,
    ) -> Option<Value> {
        if value.is_null() && !matches!(self.kind, SchemaKind::Null | SchemaKind::Any) {
            if self.required {
                errors.push(FieldError::new(path, "required field is null"));
                return None;
            }
            return Some(Value::Null);
        }

        let result = match &self.kind {
            SchemaKind::String {
                min_length,
                max_length,
            } => to_string(value, mode).and_then(|s| {
                let len = s.chars().count();
                if let Some(min) = min_length.filter(|min| len < *min) {
                    return Err(format!("string length {len} is less than minimum {min}"));
                }
                if let Some(max) = max_length.filter(|max| len > *max) {
                    return Err(format!("string length {len} is greater than maximum {max}"));
                }
                Ok(Value::String(s))
            }),

            SchemaKind::Integer { minimum, maximum } => to_integer(value, mode).and_then(|n| {
                if let Some(min) = minimum.filter(|min| n < *min) {
                    return Err(format!("value {n} is less than minimum {min}"));
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    return Err(format!("value {n} is greater than maximum {max}"));
                }
                Ok(Value::from(n))
            }),

            SchemaKind::Number { minimum, maximum } => to_number(value, mode).and_then(|n| {
                if let Some(min) = minimum.filter(|min| n < *min) {
                    return Err(format!("value {n} is less than minimum {min}"));
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    return Err(format!("value {n} is greater than maximum {max}"));
                }
                Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| format!("value {n} is not a finite number"))
            }),

            SchemaKind::Boolean => to_bool(value, mode).map(Value::Bool),

            SchemaKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(list) = value.as_array() else {
                    errors.push(FieldError::new(path, expected("array", value)));
                    return None;
                };
                let len = list.len();
                if let Some(min) = min_items.filter(|min| len < *min) {
                    errors.push(FieldError::new(
                        path,
                        format!("array length {len} is less than minimum {min}"),
                    ));
                }
                if let Some(max) = max_items.filter(|max| len > *max) {
                    errors.push(FieldError::new(
                        path,
                        format!("array length {len} is greater than maximum {max}"),
                    ));
                }
                let coerced: Vec<Value> = list
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, item)| {
                        items.coerce_at(item, &format!("{path}[{idx}]"), mode, errors)
                    })
                    .collect();
                return (coerced.len() == len).then_some(Value::Array(coerced));
            }

            SchemaKind::Object { properties } => {
                let Some(object) = value.as_object() else {
                    errors.push(FieldError::new(path, expected("object", value)));
                    return None;
                };
                let before = errors.len();
                let mut coerced = Map::new();
                for (key, schema) in properties {
                    let prop_path = format!("{path}.{key}");
                    match object.get(key) {
                        Some(prop) => {
                            if let Some(prop) = schema.coerce_at(prop, &prop_path, mode, errors) {
                                coerced.insert(key.clone(), prop);
                            }
                        }
                        None if schema.required => {
                            errors.push(FieldError::missing(prop_path));
                        }
                        None => {
                            if let Some(default) = &schema.default {
                                coerced.insert(key.clone(), default.clone());
                            }
                        }
                    }
                }
                return (errors.len() == before).then_some(Value::Object(coerced));
            }

            SchemaKind::Any => Ok(value.clone()),

            SchemaKind::Null => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    Err(expected("null", value))
                }
            }
        };

        match result {
            Ok(value) => Some(value),
            Err(reason) => {
                errors.push(FieldError::new(path, reason));
                None
            }
        }
    }
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn expected(type_name: &str, value: &Value) -> String {
    format!("expected {type_name}, got {}", value_type_name(value))
}

pub(crate) fn to_string(value: &Value, mode: Coercion) -> Result<String, String> {
    match (value, mode) {
        (Value::String(s), _) => Ok(s.clone()),
        (Value::Number(n), Coercion::Lenient) => Ok(n.to_string()),
        (Value::Bool(b), Coercion::Lenient) => Ok(b.to_string()),
        _ => Err(expected("string", value)),
    }
}

pub(crate) fn to_integer(value: &Value, mode: Coercion) -> Result<i64, String> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value {
        Value::Number(n) if n.is_u64() => Err(out_of_range(n)),
        Value::Number(n) if mode == Coercion::Lenient => match n.as_f64() {
            Some(f) if is_integral_in_range(f) => {
                #[allow(clippy::cast_possible_truncation)]
                Ok(f as i64)
            }
            Some(f) if f.fract() == 0.0 => Err(out_of_range(n)),
            _ => Err(expected("integer", value)),
        },
        Value::String(s) if mode == Coercion::Lenient => s
            .trim()
            .parse::<i64>()
            .map_err(|_| expected("integer", value)),
        _ => Err(expected("integer", value)),
    }
}

fn out_of_range(n: &Number) -> String {
    format!("value {n} is out of range for an integer")
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
#[allow(clippy::cast_precision_loss)]
fn is_integral_in_range(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

pub(crate) fn to_number(value: &Value, mode: Coercion) -> Result<f64, String> {
    if let Some(n) = value.as_f64() {
        return Ok(n);
    }
    if mode == Coercion::Lenient {
        if let Some(n) = value.as_str().and_then(|s| s.trim().parse::<f64>().ok()) {
            if n.is_finite() {
                return Ok(n);
            }
        }
    }
    Err(expected("number", value))
}

pub(crate) fn to_bool(value: &Value, mode: Coercion) -> Result<bool, String> {
    match (value, mode) {
        (Value::Bool(b), _) => Ok(*b),
        (Value::String(s), Coercion::Lenient) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            _ => Err(expected("boolean", value)),
        },
        (Value::Number(n), Coercion::Lenient) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(expected("boolean", value)),
        },
        _ => Err(expected("boolean", value)),
    }
}
