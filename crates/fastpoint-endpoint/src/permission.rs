//! Capability based permission handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use fastpoint_core::{ErrorResponse, PhaseResult, Request};
use fastpoint_di::Handler;
use fastpoint_extract::{HandlerDescriptor, ParamSpec};

/// The host's "can the current user do this" primitive.
pub trait CapabilityChecker: Send + Sync {
    /// Returns `true` if the current user holds `capability` for `args`.
    fn current_user_can(&self, capability: &str, args: &[Value]) -> bool;
}

impl<F> CapabilityChecker for F
where
    F: Fn(&str, &[Value]) -> bool + Send + Sync,
{
    fn current_user_can(&self, capability: &str, args: &[Value]) -> bool {
        self(capability, args)
    }
}

/// Builds the permission handler behind `Endpoint::has_cap`.
pub(crate) fn capability_handler(checker: Arc<dyn CapabilityChecker>, capability: String, args: Vec<Value>) -> Handler {
    let descriptor = HandlerDescriptor::new(format!("has_cap({capability})")).param(ParamSpec::new("request"));
    Handler::new(descriptor, move |call| {
        let request = call.request(0)?;
        let args: Vec<Value> = args.iter().map(|arg| substitute(&request, arg)).collect();
        if checker.current_user_can(&capability, &args) {
            return Ok(PhaseResult::json(true));
        }
        debug!(capability = %capability, "capability check denied");
        Ok(PhaseResult::Fail(ErrorResponse::forbidden("Not enough permissions")))
    })
}

/// Replaces a `<name>` placeholder with the request parameter `name`, when present.
fn substitute(request: &Request, arg: &Value) -> Value {
    let Value::String(raw) = arg else {
        return arg.clone();
    };
    let name = raw
        .trim()
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'));
    match name.and_then(|name| request.param(name)) {
        Some(value) => value.clone(),
        None => arg.clone(),
    }
}
