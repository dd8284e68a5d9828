//! Lifecycle objects passed straight through to handlers.

use fastpoint_extract::{ContextKind, HandlerDescriptor};

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;

use super::ParameterResolver;

/// Supplies the request, response, endpoint and exception objects.
///
/// A parameter is matched by its lookup name (`request`, `response`,
/// `endpoint`, `exception`) first and by its declared context type second.
/// Objects not available in the current phase are left for later stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticResolver;

impl ParameterResolver for StaticResolver {
    fn name(&self) -> &'static str {
        "static"
    }

    fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &mut CallContext<'_>,
        resolved: &mut ResolvedArguments,
        _invoker: &Invoker,
    ) -> Result<(), InvokeError> {
        for index in resolved.unresolved() {
            let Some(param) = descriptor.get(index) else {
                continue;
            };
            let kind = ContextKind::from_name(&descriptor.alias_for(index)).or_else(|| param.context_kind());
            if let Some(arg) = kind.and_then(|kind| ctx.context_arg(kind)) {
                resolved.fill(index, arg);
            }
        }
        Ok(())
    }
}
