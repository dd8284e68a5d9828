//! Resolved handler arguments.
//!
//! Handlers receive their parameters as [`Arguments`], a positional list of
//! [`Arg`]s in declaration order. Plain request data arrives as JSON values
//! (already coerced to the declared type) and can be deserialized into any
//! `DeserializeOwned` type. Context objects (request, response, endpoint,
//! exception) and injected services arrive as shared handles.
//!
//! # Example
//!
//! ```
//! use fastpoint_core::{Arg, Arguments};
//! use serde_json::json;
//!
//! let args = Arguments::new(
//!     vec!["post_id".to_string(), "tags".to_string()],
//!     vec![Arg::from(json!(10)), Arg::from(json!(["a", "b"]))],
//! );
//!
//! let post_id: i64 = args.get(0).unwrap();
//! let tags: Vec<String> = args.named("tags").unwrap();
//! assert_eq!(post_id, 10);
//! assert_eq!(tags, ["a", "b"]);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::exception::Exception;
use crate::request::Request;
use crate::response::ResponseHandle;
use crate::route::RouteInfo;

/// A single resolved argument.
#[derive(Clone)]
pub enum Arg {
    /// Request data or a literal injectable.
    Value(Value),
    /// The request being served.
    Request(Arc<Request>),
    /// The response being built.
    Response(ResponseHandle),
    /// The endpoint serving the request.
    Endpoint(Arc<RouteInfo>),
    /// The exception being handled.
    Exception(Arc<Exception>),
    /// An opaque injected service.
    Service(Arc<dyn Any + Send + Sync>),
}

impl Arg {
    /// `null`.
    #[must_use]
    pub const fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Wraps a service instance.
    #[must_use]
    pub fn service<T: Any + Send + Sync>(service: T) -> Self {
        Self::Service(Arc::new(service))
    }

    /// Name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Endpoint(_) => "endpoint",
            Self::Exception(_) => "exception",
            Self::Service(_) => "service",
        }
    }

    /// Returns the JSON value, if this is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the request handle, if this is one.
    #[must_use]
    pub const fn as_request(&self) -> Option<&Arc<Request>> {
        match self {
            Self::Request(request) => Some(request),
            _ => None,
        }
    }

    /// Returns the response handle, if this is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&ResponseHandle> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Returns the endpoint, if this is one.
    #[must_use]
    pub const fn as_endpoint(&self) -> Option<&Arc<RouteInfo>> {
        match self {
            Self::Endpoint(endpoint) => Some(endpoint),
            _ => None,
        }
    }

    /// Returns the exception, if this is one.
    #[must_use]
    pub const fn as_exception(&self) -> Option<&Arc<Exception>> {
        match self {
            Self::Exception(exception) => Some(exception),
            _ => None,
        }
    }

    /// Downcasts a service to `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Service(service) => service.clone().downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Request(request) => f.debug_tuple("Request").field(&request.id()).finish(),
            Self::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Self::Endpoint(endpoint) => f.debug_tuple("Endpoint").field(endpoint).finish(),
            Self::Exception(exception) => f.debug_tuple("Exception").field(exception).finish(),
            Self::Service(_) => f.write_str("Service(..)"),
        }
    }
}

/// Error reading an argument out of [`Arguments`].
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// No argument at this position.
    #[error("No argument at position {index}")]
    OutOfRange {
        /// Requested position.
        index: usize,
    },

    /// No argument with this name.
    #[error("No argument named '{name}'")]
    UnknownName {
        /// Requested name.
        name: String,
    },

    /// The argument is of another kind.
    #[error("Argument '{name}' is a {found}, expected a {expected}")]
    UnexpectedKind {
        /// Parameter name.
        name: String,
        /// Expected kind.
        expected: &'static str,
        /// Actual kind.
        found: &'static str,
    },

    /// The JSON value does not deserialize into the requested type.
    #[error("Argument '{name}' could not be deserialized: {source}")]
    Deserialize {
        /// Parameter name.
        name: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Positional arguments handed to a handler.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Arg>,
}

impl Arguments {
    /// Creates arguments from parallel name and value lists.
    #[must_use]
    pub fn new(names: Vec<String>, values: Vec<Arg>) -> Self {
        Self { names, values }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the handler takes no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw argument at `index`.
    pub fn arg(&self, index: usize) -> Result<&Arg, ArgumentError> {
        self.values
            .get(index)
            .ok_or(ArgumentError::OutOfRange { index })
    }

    /// Returns the position of the parameter called `name`.
    pub fn position(&self, name: &str) -> Result<usize, ArgumentError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ArgumentError::UnknownName {
                name: name.to_string(),
            })
    }

    /// Deserializes the value at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, ArgumentError> {
        let value = self.value(index)?;
        serde_json::from_value(value.clone()).map_err(|source| ArgumentError::Deserialize {
            name: self.name(index),
            source,
        })
    }

    /// Deserializes the value of the parameter called `name`.
    pub fn named<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        self.get(self.position(name)?)
    }

    /// Returns the JSON value at `index`.
    pub fn value(&self, index: usize) -> Result<&Value, ArgumentError> {
        let arg = self.arg(index)?;
        arg.as_value().ok_or_else(|| self.unexpected(index, "value", arg))
    }

    /// Returns the request at `index`.
    pub fn request(&self, index: usize) -> Result<Arc<Request>, ArgumentError> {
        let arg = self.arg(index)?;
        arg.as_request()
            .cloned()
            .ok_or_else(|| self.unexpected(index, "request", arg))
    }

    /// Returns the response handle at `index`.
    pub fn response(&self, index: usize) -> Result<ResponseHandle, ArgumentError> {
        let arg = self.arg(index)?;
        arg.as_response()
            .cloned()
            .ok_or_else(|| self.unexpected(index, "response", arg))
    }

    /// Returns the endpoint at `index`.
    pub fn endpoint(&self, index: usize) -> Result<Arc<RouteInfo>, ArgumentError> {
        let arg = self.arg(index)?;
        arg.as_endpoint()
            .cloned()
            .ok_or_else(|| self.unexpected(index, "endpoint", arg))
    }

    /// Returns the exception at `index`.
    pub fn exception(&self, index: usize) -> Result<Arc<Exception>, ArgumentError> {
        let arg = self.arg(index)?;
        arg.as_exception()
            .cloned()
            .ok_or_else(|| self.unexpected(index, "exception", arg))
    }

    /// Returns the service at `index`, downcast to `T`.
    pub fn service<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ArgumentError> {
        let arg = self.arg(index)?;
        arg.downcast::<T>()
            .ok_or_else(|| self.unexpected(index, std::any::type_name::<T>(), arg))
    }

    /// Consumes the arguments, yielding the values in order.
    #[must_use]
    pub fn into_values(self) -> Vec<Arg> {
        self.values
    }

    fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    fn unexpected(&self, index: usize, expected: &'static str, found: &Arg) -> ArgumentError {
        ArgumentError::UnexpectedKind {
            name: self.name(index),
            expected,
            found: found.kind(),
        }
    }
}
