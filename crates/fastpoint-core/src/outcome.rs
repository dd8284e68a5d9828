use serde_json::Value;

use crate::error::ErrorResponse;
use crate::response::Response;
use crate::value::Arg;

/// What a handler phase produced.
///
/// `Respond` and `Fail` are terminal: once either is produced nothing else in
/// the lifecycle runs.
#[derive(Debug, Clone)]
pub enum PhaseResult {
    /// Keep going with this value.
    Continue(Arg),
    /// Stop and return this response.
    Respond(Response),
    /// Stop and return this error.
    Fail(ErrorResponse),
}

impl PhaseResult {
    /// Continue with `null`.
    #[must_use]
    pub fn null() -> Self {
        Self::Continue(Arg::Value(Value::Null))
    }

    /// Continue with a JSON value.
    #[must_use]
    pub fn json(value: impl Into<Value>) -> Self {
        Self::Continue(Arg::Value(value.into()))
    }

    /// Returns `true` for `Respond` and `Fail`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Respond(_) | Self::Fail(_))
    }
}

impl From<Value> for PhaseResult {
    fn from(value: Value) -> Self {
        Self::json(value)
    }
}

impl From<Arg> for PhaseResult {
    fn from(arg: Arg) -> Self {
        Self::Continue(arg)
    }
}

impl From<Response> for PhaseResult {
    fn from(response: Response) -> Self {
        Self::Respond(response)
    }
}

impl From<ErrorResponse> for PhaseResult {
    fn from(error: ErrorResponse) -> Self {
        Self::Fail(error)
    }
}
