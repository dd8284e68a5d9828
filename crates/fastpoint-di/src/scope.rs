//! Per-request resolution state.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;

use fastpoint_core::{Arg, Exception, Request, ResponseHandle, RouteInfo};
use fastpoint_extract::{ContextKind, Validator};

use crate::registry::InjectableRegistry;

/// Memoized injectables and the resolver call stack for one request.
///
/// A scope is created when a request starts and shared by every handler
/// invoked for it: permission handlers, middleware, the main handler and
/// exception handlers all see the same memoized values.
#[derive(Debug, Default)]
pub struct InvocationScope {
    call_stack: IndexSet<String>,
    resolved: HashMap<String, Arg>,
}

impl InvocationScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `name` on the call stack.
    ///
    /// Returns `false` if `name` is already being resolved.
    pub fn enter(&mut self, name: &str) -> bool {
        self.call_stack.insert(name.to_string())
    }

    /// Pops `name` from the call stack.
    pub fn exit(&mut self, name: &str) {
        self.call_stack.shift_remove(name);
    }

    /// Returns `true` while the resolver for `name` is running.
    #[must_use]
    pub fn is_resolving(&self, name: &str) -> bool {
        self.call_stack.contains(name)
    }

    /// Resolvers currently running, outermost first.
    pub fn call_stack(&self) -> impl Iterator<Item = &str> {
        self.call_stack.iter().map(String::as_str)
    }

    /// The memoized value for `name`.
    #[must_use]
    pub fn memoized(&self, name: &str) -> Option<&Arg> {
        self.resolved.get(name)
    }

    /// Records the value produced for `name`.
    pub fn memoize(&mut self, name: impl Into<String>, value: Arg) {
        self.resolved.insert(name.into(), value);
    }

    /// Number of memoized injectables.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

/// Everything a handler invocation can draw its arguments from.
pub struct CallContext<'s> {
    request: Arc<Request>,
    response: Option<ResponseHandle>,
    endpoint: Arc<RouteInfo>,
    exception: Option<Arc<Exception>>,
    registry: Arc<InjectableRegistry>,
    validator: Arc<dyn Validator>,
    scope: &'s mut InvocationScope,
}

impl<'s> CallContext<'s> {
    /// Creates a context without a response or exception.
    pub fn new(
        request: Arc<Request>,
        endpoint: Arc<RouteInfo>,
        registry: Arc<InjectableRegistry>,
        validator: Arc<dyn Validator>,
        scope: &'s mut InvocationScope,
    ) -> Self {
        Self {
            request,
            response: None,
            endpoint,
            exception: None,
            registry,
            validator,
            scope,
        }
    }

    /// Makes the response available to handlers.
    #[must_use]
    pub fn with_response(mut self, response: ResponseHandle) -> Self {
        self.response = Some(response);
        self
    }

    /// Makes an exception available to handlers.
    #[must_use]
    pub fn with_exception(mut self, exception: Arc<Exception>) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Reborrows this context for an exception handler call.
    ///
    /// The new context shares the scope, so memoized injectables carry over.
    pub fn for_exception(&mut self, exception: Arc<Exception>) -> CallContext<'_> {
        CallContext {
            request: Arc::clone(&self.request),
            response: self.response.clone(),
            endpoint: Arc::clone(&self.endpoint),
            exception: Some(exception),
            registry: Arc::clone(&self.registry),
            validator: Arc::clone(&self.validator),
            scope: self.scope,
        }
    }

    /// The request.
    #[must_use]
    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    /// The response, once the main handler phase has started.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseHandle> {
        self.response.as_ref()
    }

    /// The endpoint serving the request.
    #[must_use]
    pub fn endpoint(&self) -> &Arc<RouteInfo> {
        &self.endpoint
    }

    /// The exception being handled, if any.
    #[must_use]
    pub fn exception(&self) -> Option<&Arc<Exception>> {
        self.exception.as_ref()
    }

    /// The injectables visible to this call.
    #[must_use]
    pub fn registry(&self) -> &Arc<InjectableRegistry> {
        &self.registry
    }

    /// The validator used to coerce request data.
    #[must_use]
    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    /// The request scope.
    #[must_use]
    pub fn scope(&self) -> &InvocationScope {
        self.scope
    }

    /// The request scope, mutably.
    pub fn scope_mut(&mut self) -> &mut InvocationScope {
        self.scope
    }

    /// The context object of the given kind, if present.
    #[must_use]
    pub fn context_arg(&self, kind: ContextKind) -> Option<Arg> {
        match kind {
            ContextKind::Request => Some(Arg::Request(Arc::clone(&self.request))),
            ContextKind::Response => self.response.clone().map(Arg::Response),
            ContextKind::Endpoint => Some(Arg::Endpoint(Arc::clone(&self.endpoint))),
            ContextKind::Exception => self.exception.clone().map(Arg::Exception),
        }
    }
}

impl std::fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("request", &self.request.id())
            .field("endpoint", &self.endpoint.full_route())
            .field("has_response", &self.response.is_some())
            .field("has_exception", &self.exception.is_some())
            .finish_non_exhaustive()
    }
}
