//! Runs a handler once its arguments are resolved.

use std::sync::Arc;

use tracing::debug;

use fastpoint_core::PhaseResult;

use crate::chain::ResolverChain;
use crate::error::InvokeError;
use crate::handler::Handler;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;

/// Resolves a handler's arguments and calls it.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    chain: Arc<ResolverChain>,
}

impl Invoker {
    /// Creates an invoker with the default chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an invoker with a custom chain.
    #[must_use]
    pub fn with_chain(chain: ResolverChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// The resolver chain.
    #[must_use]
    pub fn chain(&self) -> &ResolverChain {
        &self.chain
    }

    /// Calls `handler` with arguments drawn from `ctx`.
    ///
    /// Slots the chain leaves empty take the declared default, or `null` when
    /// nullable; otherwise the call fails before the handler body runs.
    pub fn call(&self, handler: &Handler, ctx: &mut CallContext<'_>) -> Result<PhaseResult, InvokeError> {
        let descriptor = handler.descriptor();
        let mut resolved = ResolvedArguments::new(descriptor.arity());
        self.chain.resolve(descriptor, ctx, &mut resolved, self)?;
        let args = resolved.into_arguments(descriptor)?;

        debug!(handler = handler.name(), arity = args.len(), "invoking handler");
        handler.call(args).map_err(InvokeError::Thrown)
    }
}
