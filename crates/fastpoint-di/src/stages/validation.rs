//! Request data lookup, coercion and validation.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use fastpoint_core::{Arg, FieldError, ResolutionError};
use fastpoint_extract::{HandlerDescriptor, LazyParameters, ParamType, Validator};

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;

use super::ParameterResolver;

/// Supplies the remaining parameters from request data.
///
/// Raw values are located through [`LazyParameters`] and coerced by the
/// context's validator. For union types the first member that accepts the
/// value wins. Absent values fall back to the declared default, then to
/// `null` for nullable parameters. Every violation is collected before the
/// stage fails with a single [`ResolutionError::InvalidData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationResolver;

impl ParameterResolver for ValidationResolver {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &mut CallContext<'_>,
        resolved: &mut ResolvedArguments,
        _invoker: &Invoker,
    ) -> Result<(), InvokeError> {
        let pending = resolved.unresolved();
        if pending.is_empty() {
            return Ok(());
        }

        let request = Arc::clone(ctx.request());
        let validator = Arc::clone(ctx.validator());
        let mut lazy = LazyParameters::new(descriptor, &request);
        let mut errors = Vec::new();

        for index in pending {
            let Some(param) = descriptor.get(index) else {
                continue;
            };
            lazy.has_index(index);
            let field = descriptor.alias_for(index);

            let Some(raw) = lazy.get(&field).cloned() else {
                if let Some(default) = param.declared_default() {
                    resolved.fill(index, Arg::Value(default.clone()));
                } else if param.is_nullable() {
                    resolved.fill(index, Arg::null());
                } else {
                    errors.push(FieldError::missing(field));
                }
                continue;
            };

            if raw.is_null() && param.is_nullable() {
                resolved.fill(index, Arg::null());
                continue;
            }

            match coerce_union(validator.as_ref(), &field, &raw, param.types()) {
                Ok(value) => resolved.fill(index, Arg::Value(value)),
                Err(mut violations) => errors.append(&mut violations),
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        debug!(handler = descriptor.name(), errors = errors.len(), "request data rejected");
        Err(ResolutionError::InvalidData { errors }.into())
    }
}

/// Tries each member of the declared type in order.
fn coerce_union(
    validator: &dyn Validator,
    field: &str,
    raw: &Value,
    types: &[ParamType],
) -> Result<Value, Vec<FieldError>> {
    let mut last = Vec::new();
    for ty in types {
        match validator.coerce(field, raw, ty) {
            Ok(value) => return Ok(value),
            Err(errors) => last = errors,
        }
    }
    if types.is_empty() {
        return Ok(raw.clone());
    }
    Err(last)
}
