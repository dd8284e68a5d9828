//! Injected parameters.

use std::sync::Arc;

use fastpoint_extract::HandlerDescriptor;

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;

use super::ParameterResolver;

/// Supplies parameters marked as injected from the context's registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectResolver;

impl ParameterResolver for InjectResolver {
    fn name(&self) -> &'static str {
        "inject"
    }

    fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &mut CallContext<'_>,
        resolved: &mut ResolvedArguments,
        invoker: &Invoker,
    ) -> Result<(), InvokeError> {
        for index in resolved.unresolved() {
            let Some(param) = descriptor.get(index) else {
                continue;
            };
            let Some(name) = param.injectable_name() else {
                continue;
            };
            let registry = Arc::clone(ctx.registry());
            let arg = registry.resolve(name, param.name(), ctx, invoker)?;
            resolved.fill(index, arg);
        }
        Ok(())
    }
}
