//! The ordered list of resolvers that fills a handler's arguments.

use std::fmt;

use tracing::trace;

use fastpoint_extract::HandlerDescriptor;

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;
use crate::stages::{InjectResolver, ParameterResolver, StaticResolver, ValidationResolver};

/// Ordered list of resolver stages.
///
/// The default chain is static, then inject, then validation. Resolution
/// stops early once every slot is filled.
pub struct ResolverChain {
    stages: Vec<Box<dyn ParameterResolver>>,
}

impl ResolverChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl ParameterResolver + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names, in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Runs every stage in order.
    pub fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &mut CallContext<'_>,
        resolved: &mut ResolvedArguments,
        invoker: &Invoker,
    ) -> Result<(), InvokeError> {
        for stage in &self.stages {
            if resolved.is_complete() {
                break;
            }
            stage.resolve(descriptor, ctx, resolved, invoker)?;
            trace!(
                handler = descriptor.name(),
                stage = stage.name(),
                pending = resolved.unresolved().len(),
                "resolver stage done"
            );
        }
        Ok(())
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::empty()
            .with_stage(StaticResolver)
            .with_stage(InjectResolver)
            .with_stage(ValidationResolver)
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}
