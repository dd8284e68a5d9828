//! Handlers: a descriptor plus the function it describes.

use std::fmt;
use std::sync::Arc;

use fastpoint_core::{Arguments, Exception, PhaseResult};
use fastpoint_extract::HandlerDescriptor;

/// Signature of every handler body.
pub type HandlerFn = dyn Fn(Arguments) -> Result<PhaseResult, Exception> + Send + Sync;

/// A callable with an immutable parameter description.
///
/// The function receives its arguments positionally, in the order the
/// descriptor declares them. Returning `Err` throws an [`Exception`] that the
/// endpoint maps through its exception handlers.
///
/// # Example
///
/// ```rust
/// use fastpoint_core::PhaseResult;
/// use fastpoint_di::Handler;
/// use fastpoint_extract::{HandlerDescriptor, ParamSpec};
///
/// let handler = Handler::new(
///     HandlerDescriptor::new("double").param(ParamSpec::new("n").int()),
///     |args| {
///         let n: i64 = args.get(0)?;
///         Ok(PhaseResult::json(n * 2))
///     },
/// );
/// assert_eq!(handler.name(), "double");
/// ```
#[derive(Clone)]
pub struct Handler {
    descriptor: Arc<HandlerDescriptor>,
    func: Arc<HandlerFn>,
}

impl Handler {
    /// Creates a handler.
    pub fn new<F>(descriptor: HandlerDescriptor, func: F) -> Self
    where
        F: Fn(Arguments) -> Result<PhaseResult, Exception> + Send + Sync + 'static,
    {
        Self {
            descriptor: Arc::new(descriptor),
            func: Arc::new(func),
        }
    }

    /// Creates a handler that takes no parameters.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Result<PhaseResult, Exception> + Send + Sync + 'static,
    {
        Self::new(HandlerDescriptor::new(name), move |_| func())
    }

    /// The parameter description.
    #[must_use]
    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    /// Handler name, for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Calls the handler body with already resolved arguments.
    pub fn call(&self, args: Arguments) -> Result<PhaseResult, Exception> {
        (self.func)(args)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
