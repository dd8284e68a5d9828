//! Stages of the resolver chain.
//!
//! Each stage inspects only the slots earlier stages left empty and fills
//! what it can. A stage that fails aborts the whole resolution.

mod inject;
mod static_params;
mod validation;

pub use inject::InjectResolver;
pub use static_params::StaticResolver;
pub use validation::ValidationResolver;

use fastpoint_extract::HandlerDescriptor;

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::resolved::ResolvedArguments;
use crate::scope::CallContext;

/// One stage of the resolver chain.
pub trait ParameterResolver: Send + Sync {
    /// Stage name, for logs.
    fn name(&self) -> &'static str;

    /// Fills unresolved slots of `resolved` for a handler described by `descriptor`.
    ///
    /// `invoker` is available to stages that call other handlers.
    fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &mut CallContext<'_>,
        resolved: &mut ResolvedArguments,
        invoker: &Invoker,
    ) -> Result<(), InvokeError>;
}
