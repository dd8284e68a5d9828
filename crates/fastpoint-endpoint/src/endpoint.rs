//! Endpoints and their request lifecycle.
//!
//! A request moves through four phases:
//!
//! 1. **Permission** - permission handlers, in order
//! 2. **Request** - `on_request` middleware handlers
//! 3. **Main** - the endpoint handler; its value becomes the response data
//! 4. **Response** - `on_response` middleware handlers and response schemas
//!
//! Every handler of every phase shares one [`InvocationScope`], so an
//! injectable resolved during the permission check is not resolved again by
//! the main handler. The first handler that returns an early response or an
//! error ends the request.
//!
//! Thrown exceptions are mapped through the endpoint's exception handlers,
//! using the handler registered for the thrown class or its nearest ancestor.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use fastpoint_core::{
    Arg, ErrorResponse, Exception, ExceptionClass, PhaseResult, Request, Response, ResponseHandle, RouteInfo,
};
use fastpoint_di::{
    CallContext, Handler, Injectable, InjectableRegistry, InvocationScope, InvokeError, Invoker, SERIALIZER, VALIDATOR,
};
use fastpoint_extract::{DefaultValidator, JsonSerializer, Schema, Serializer, Validator};

use crate::error::RegistrationError;
use crate::exceptions::ExceptionHandlerTable;
use crate::extensions::{ErrorCause, Extensions, NoExtensions};
use crate::middleware::Middleware;
use crate::permission::{capability_handler, CapabilityChecker};
use crate::registrar::RouteArgs;
use crate::response::ResponseSchema;

/// A response-phase step.
#[derive(Debug, Clone)]
enum Step {
    Call(Handler),
    Validate(ResponseSchema),
}

/// A route served by a handler, with its permission, middleware and
/// exception handlers.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fastpoint_core::{PhaseResult, Request};
/// use fastpoint_di::Handler;
/// use fastpoint_endpoint::Endpoint;
/// use fastpoint_extract::{HandlerDescriptor, ParamSpec};
/// use http::Method;
///
/// let endpoint = Endpoint::new(
///     Method::GET,
///     "posts/(?P<id>[\\d]+)",
///     Handler::new(
///         HandlerDescriptor::new("get_post").param(ParamSpec::new("id").int()),
///         |args| {
///             let id: i64 = args.get(0)?;
///             Ok(PhaseResult::json(serde_json::json!({"id": id})))
///         },
///     ),
/// );
///
/// let request = Request::new(Method::GET, "/posts/5").with_url_param("id", "5");
/// let response = endpoint.handle(Arc::new(request)).unwrap();
/// assert_eq!(response.data(), &serde_json::json!({"id": 5}));
/// ```
pub struct Endpoint {
    method: Method,
    route: String,
    route_info: Arc<RouteInfo>,
    handler: Handler,
    args: Map<String, Value>,
    override_existing: bool,
    permission_handlers: Vec<Handler>,
    on_request: Vec<Handler>,
    on_response: Vec<Step>,
    plugins: Option<Vec<String>>,
    registry: Arc<InjectableRegistry>,
    exception_handlers: ExceptionHandlerTable,
    validator: Arc<dyn Validator>,
    serializer: Arc<dyn Serializer>,
    extensions: Arc<dyn Extensions>,
    invoker: Invoker,
    pending_error: Option<RegistrationError>,
}

impl Endpoint {
    /// Creates an endpoint serving `route` with `handler`.
    pub fn new(method: Method, route: impl Into<String>, handler: Handler) -> Self {
        let route = route.into();
        Self {
            route_info: Arc::new(RouteInfo::new(method.clone(), route.clone())),
            method,
            route,
            handler,
            args: Map::new(),
            override_existing: false,
            permission_handlers: Vec::new(),
            on_request: Vec::new(),
            on_response: Vec::new(),
            plugins: None,
            registry: Arc::new(InjectableRegistry::new()),
            exception_handlers: ExceptionHandlerTable::new(),
            validator: Arc::new(DefaultValidator::new()),
            serializer: Arc::new(JsonSerializer::new()),
            extensions: Arc::new(NoExtensions),
            invoker: Invoker::new(),
            pending_error: None,
        }
    }

    /// Host arguments that override the generated ones.
    pub fn args(&mut self, args: Map<String, Value>) -> &mut Self {
        self.args.extend(args);
        self
    }

    /// Whether registration may replace an existing route.
    pub fn override_existing(&mut self, override_existing: bool) -> &mut Self {
        self.override_existing = override_existing;
        self
    }

    /// Adds a permission handler.
    ///
    /// Permission handlers deny access by returning [`PhaseResult::Fail`].
    pub fn permission(&mut self, handler: Handler) -> &mut Self {
        self.permission_handlers.push(handler);
        self
    }

    /// Requires the current user to hold `capability`.
    ///
    /// String arguments of the form `<name>` are replaced with the request
    /// parameter `name` when the request has it.
    pub fn has_cap(
        &mut self,
        checker: Arc<dyn CapabilityChecker>,
        capability: impl Into<String>,
        args: Vec<Value>,
    ) -> &mut Self {
        let capability = capability.into();
        if capability.is_empty() {
            self.pending_error = Some(RegistrationError::EmptyCapability {
                route: self.route.clone(),
            });
            return self;
        }
        self.permission(capability_handler(checker, capability, args))
    }

    /// Filters the response data through `schema` before it is sent.
    pub fn returns(&mut self, schema: impl Into<Arc<Schema>>) -> &mut Self {
        self.on_response.push(Step::Validate(ResponseSchema::new(schema)));
        self
    }

    /// Plugs in a middleware.
    pub fn middleware(&mut self, middleware: &dyn Middleware) -> &mut Self {
        debug!(middleware = middleware.name(), route = %self.route, "adding middleware");
        if let Some(handler) = middleware.on_request() {
            self.on_request.push(handler);
        }
        if let Some(handler) = middleware.on_response() {
            self.on_response.push(Step::Call(handler));
        }
        self
    }

    /// Declares plugins the route depends on.
    pub fn depends<I, S>(&mut self, plugins: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.plugins.get_or_insert_with(Vec::new);
        for plugin in plugins {
            let plugin = plugin.into();
            if !list.contains(&plugin) {
                list.push(plugin);
            }
        }
        self
    }

    /// Registers an exception handler for `class` and its descendants.
    pub fn on_exception(&mut self, class: &ExceptionClass, handler: Handler, override_existing: bool) -> &mut Self {
        self.exception_handlers.insert(class, handler, override_existing);
        self
    }

    /// Registers an injectable visible to this endpoint's handlers.
    pub fn inject(&mut self, name: impl Into<String>, entry: impl Into<Injectable>, override_existing: bool) -> &mut Self {
        Arc::make_mut(&mut self.registry).register(name, entry, override_existing);
        self
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The route, relative to the router.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The route including namespace, once registered.
    #[must_use]
    pub fn full_route(&self) -> &str {
        self.route_info.full_route()
    }

    /// Plugins the route depends on.
    #[must_use]
    pub fn plugins(&self) -> Option<&[String]> {
        self.plugins.as_deref()
    }

    /// The endpoint's injectables.
    #[must_use]
    pub fn injectables(&self) -> &InjectableRegistry {
        &self.registry
    }

    /// The endpoint's exception handlers.
    #[must_use]
    pub fn exception_handlers(&self) -> &ExceptionHandlerTable {
        &self.exception_handlers
    }

    /// Returns `true` if permission handlers are declared.
    #[must_use]
    pub fn has_permission_handlers(&self) -> bool {
        !self.permission_handlers.is_empty()
    }

    /// Returns `true` if registration may replace an existing route.
    #[must_use]
    pub const fn overrides_existing(&self) -> bool {
        self.override_existing
    }

    pub(crate) fn inherit(
        &mut self,
        plugins: Option<&[String]>,
        injectables: &InjectableRegistry,
        exception_handlers: &ExceptionHandlerTable,
    ) {
        if let Some(plugins) = plugins {
            self.depends(plugins.iter().cloned());
        }
        Arc::make_mut(&mut self.registry).merge_missing(injectables);
        self.exception_handlers.merge_missing(exception_handlers);
    }

    pub(crate) fn set_collaborators(
        &mut self,
        validator: Option<Arc<dyn Validator>>,
        serializer: Option<Arc<dyn Serializer>>,
        extensions: Arc<dyn Extensions>,
    ) {
        if let Some(validator) = validator {
            self.validator = validator;
        }
        if let Some(serializer) = serializer {
            self.serializer = serializer;
        }
        self.extensions = extensions;
    }

    /// Prepares the endpoint for registration under `namespace` and `rest_base`.
    ///
    /// Returns the host route (relative to the namespace) and its arguments,
    /// or `None` when the `endpoint_args` extension skips the endpoint.
    pub fn register(&mut self, namespace: &str, rest_base: &str) -> Result<Option<(String, RouteArgs)>, RegistrationError> {
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }

        let validator = self.extensions.validator(Arc::clone(&self.validator));
        let serializer = self.extensions.serializer(Arc::clone(&self.serializer));
        let registry = Arc::make_mut(&mut self.registry);
        registry.register(VALIDATOR, Injectable::service(Arc::clone(&validator)), true);
        registry.register(SERIALIZER, Injectable::service(Arc::clone(&serializer)), true);
        self.validator = validator;
        self.serializer = serializer;

        let mut args = RouteArgs::new(self.method.as_str());
        args.permission_callback = self.has_permission_handlers();
        args.depends.clone_from(&self.plugins);
        args.merge(&self.args);

        let Some(args) = self.extensions.endpoint_args(args, namespace, rest_base, self) else {
            info!(route = %self.route, "endpoint registration skipped");
            return Ok(None);
        };

        let mut route = rest_base.to_string();
        if !rest_base.ends_with('/') && !self.route.starts_with('/') {
            route.push('/');
        }
        route.push_str(&self.route);
        let route = self.extensions.endpoint_route(route, self);

        // Hosts store routes with the namespace and route trimmed of slashes.
        let full_route = format!("/{}/{}", namespace.trim_matches('/'), route.trim_matches('/'));
        self.route_info = Arc::new(RouteInfo::new(self.method.clone(), self.route.clone()).with_full_route(full_route));
        info!(method = %self.method, full_route = %self.full_route(), "endpoint registered");
        Ok(Some((route, args)))
    }

    /// Runs the permission phase in a fresh scope.
    pub fn permission_callback(&self, request: Arc<Request>) -> Result<(), ErrorResponse> {
        let mut scope = InvocationScope::new();
        self.check_permissions(request, &mut scope)
    }

    /// Runs the request, main and response phases in a fresh scope.
    pub fn callback(&self, request: Arc<Request>) -> Result<Response, ErrorResponse> {
        let mut scope = InvocationScope::new();
        self.serve(request, &mut scope)
    }

    /// Runs every phase in a single scope.
    pub fn handle(&self, request: Arc<Request>) -> Result<Response, ErrorResponse> {
        let mut scope = InvocationScope::new();
        self.check_permissions(Arc::clone(&request), &mut scope)?;
        self.serve(request, &mut scope)
    }

    fn context<'s>(&self, request: Arc<Request>, scope: &'s mut InvocationScope) -> CallContext<'s> {
        CallContext::new(
            request,
            Arc::clone(&self.route_info),
            Arc::clone(&self.registry),
            Arc::clone(&self.validator),
            scope,
        )
    }

    fn check_permissions(&self, request: Arc<Request>, scope: &mut InvocationScope) -> Result<(), ErrorResponse> {
        if self.permission_handlers.is_empty() {
            return Ok(());
        }
        let mut ctx = self.context(request, scope);
        for handler in &self.permission_handlers {
            match self.run(handler, &mut ctx) {
                PhaseResult::Continue(_) => {}
                PhaseResult::Respond(_) => {
                    debug!(route = %self.full_route(), handler = handler.name(), "permission granted early");
                    return Ok(());
                }
                PhaseResult::Fail(error) => {
                    debug!(
                        route = %self.full_route(),
                        handler = handler.name(),
                        status = error.status(),
                        "permission denied"
                    );
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    fn serve(&self, request: Arc<Request>, scope: &mut InvocationScope) -> Result<Response, ErrorResponse> {
        let response = ResponseHandle::new(Response::new());
        let mut ctx = self.context(Arc::clone(&request), scope).with_response(response.clone());

        for handler in &self.on_request {
            let result = self.run(handler, &mut ctx);
            if result.is_terminal() {
                return Self::finish_early(result, "request");
            }
        }

        match self.run(&self.handler, &mut ctx) {
            PhaseResult::Continue(arg) => response.lock().set_data(into_data(arg)),
            terminal => return Self::finish_early(terminal, "main"),
        }

        for step in &self.on_response {
            match step {
                Step::Call(handler) => {
                    let result = self.run(handler, &mut ctx);
                    if result.is_terminal() {
                        return Self::finish_early(result, "response");
                    }
                }
                Step::Validate(schema) => {
                    let failure = schema.apply(
                        &request,
                        &response,
                        self.extensions.as_ref(),
                        Arc::clone(&self.validator),
                        Arc::clone(&self.serializer),
                    );
                    if let Some(error) = failure {
                        return Err(error);
                    }
                }
            }
        }

        Ok(response.snapshot())
    }

    fn finish_early(result: PhaseResult, phase: &'static str) -> Result<Response, ErrorResponse> {
        match result {
            PhaseResult::Respond(response) => {
                debug!(phase, status = response.status(), "phase returned a response");
                Ok(response)
            }
            PhaseResult::Fail(error) => {
                debug!(phase, status = error.status(), "phase returned an error");
                Err(error)
            }
            PhaseResult::Continue(arg) => Ok(Response::json(into_data(arg))),
        }
    }

    /// Calls one handler, mapping every failure to a phase result.
    fn run(&self, handler: &Handler, ctx: &mut CallContext<'_>) -> PhaseResult {
        match self.invoker.call(handler, ctx) {
            Ok(result) => terminal_response(result),
            Err(InvokeError::Halted(result)) => result,
            Err(InvokeError::Resolution(resolution)) => {
                let error = ErrorResponse::from(resolution.clone());
                PhaseResult::Fail(self.request_error(error, ErrorCause::Resolution(&resolution)))
            }
            Err(InvokeError::Thrown(exception)) => self.handle_exception(exception, ctx),
        }
    }

    fn handle_exception(&self, exception: Exception, ctx: &mut CallContext<'_>) -> PhaseResult {
        let Some((class, handler)) = self.exception_handlers.find(exception.class()) else {
            warn!(
                route = %self.full_route(),
                exception = %exception.class(),
                message = exception.message(),
                "unhandled exception"
            );
            let error = ErrorResponse::internal(exception.message());
            return PhaseResult::Fail(self.request_error(error, ErrorCause::Exception(&exception)));
        };

        debug!(
            route = %self.full_route(),
            exception = %exception.class(),
            handler = handler.name(),
            "mapping exception"
        );
        let exception = Arc::new(exception);
        let mut handler_ctx = ctx.for_exception(Arc::clone(&exception));
        match self.invoker.call(handler, &mut handler_ctx) {
            Ok(PhaseResult::Continue(Arg::Response(response))) => PhaseResult::Respond(response.snapshot()),
            Ok(PhaseResult::Continue(_)) => PhaseResult::null(),
            Ok(terminal) | Err(InvokeError::Halted(terminal)) => terminal,
            Err(InvokeError::Resolution(resolution)) => {
                let error = ErrorResponse::from(resolution.clone());
                PhaseResult::Fail(self.request_error(error, ErrorCause::Resolution(&resolution)))
            }
            Err(InvokeError::Thrown(inner)) => {
                error!(
                    route = %self.full_route(),
                    exception = class,
                    message = inner.message(),
                    "exception handler failed"
                );
                let error = ErrorResponse::internal(format!("Bad exception handler for: {class}"));
                PhaseResult::Fail(self.request_error(error, ErrorCause::Exception(&inner)))
            }
        }
    }

    fn request_error(&self, error: ErrorResponse, cause: ErrorCause<'_>) -> ErrorResponse {
        self.extensions.request_error(error, cause, &self.route_info)
    }
}

/// A response handle returned by a handler ends the request with that response.
fn terminal_response(result: PhaseResult) -> PhaseResult {
    match result {
        PhaseResult::Continue(Arg::Response(response)) => PhaseResult::Respond(response.snapshot()),
        other => other,
    }
}

fn into_data(arg: Arg) -> Value {
    match arg {
        Arg::Value(value) => value,
        other => {
            debug!(kind = other.kind(), "handler returned a non-data value");
            Value::Null
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("route", &self.route)
            .field("full_route", &self.full_route())
            .field("handler", &self.handler.name())
            .field("permission_handlers", &self.permission_handlers.len())
            .field("on_request", &self.on_request.len())
            .field("on_response", &self.on_response.len())
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastpoint_extract::{HandlerDescriptor, ParamSpec};
    use serde_json::json;

    fn returning(value: Value) -> Handler {
        Handler::from_fn("main", move || Ok(PhaseResult::json(value.clone())))
    }

    fn request() -> Arc<Request> {
        Arc::new(Request::new(Method::POST, "/"))
    }

    #[test]
    fn test_route_joining() {
        let mut endpoint = Endpoint::new(Method::GET, "posts", returning(json!(null)));
        let (route, args) = endpoint.register("my-api/v1", "").expect("ok").expect("registered");
        assert_eq!(route, "/posts");
        assert_eq!(endpoint.full_route(), "/my-api/v1/posts");
        assert_eq!(args.methods, "GET");
        assert!(!args.permission_callback);

        let mut nested = Endpoint::new(Method::GET, "/posts", returning(json!(null)));
        let (route, _) = nested.register("my-api/v1", "users/").expect("ok").expect("registered");
        assert_eq!(route, "users//posts");

        let mut sub = Endpoint::new(Method::GET, "posts", returning(json!(null)));
        let (route, _) = sub.register("my-api/v1", "users").expect("ok").expect("registered");
        assert_eq!(route, "users/posts");
        assert_eq!(sub.full_route(), "/my-api/v1/users/posts");
    }

    #[test]
    fn test_user_args_override_generated_ones() {
        let mut endpoint = Endpoint::new(Method::GET, "posts", returning(json!(null)));
        let mut overrides = Map::new();
        overrides.insert("methods".into(), json!("GET, POST"));
        endpoint.args(overrides).depends(["buddypress"]).permission(returning(json!(true)));

        let (_, args) = endpoint.register("api/v1", "").expect("ok").expect("registered");
        assert_eq!(args.methods, "GET, POST");
        assert!(args.permission_callback);
        assert_eq!(args.depends, Some(vec!["buddypress".to_string()]));
    }

    #[test]
    fn test_empty_capability_fails_registration() {
        let checker: Arc<dyn CapabilityChecker> = Arc::new(|_: &str, _: &[Value]| true);
        let mut endpoint = Endpoint::new(Method::GET, "posts", returning(json!(null)));
        endpoint.has_cap(checker, "", Vec::new());
        let error = endpoint.register("api/v1", "").expect_err("empty capability");
        assert_eq!(error.to_string(), "Invalid capability. Empty capability given");
    }

    #[test]
    fn test_main_value_becomes_response_data() {
        let endpoint = Endpoint::new(Method::POST, "posts", returning(json!({"id": 1})));
        let response = endpoint.handle(request()).expect("success");
        assert_eq!(response.status(), 200);
        assert_eq!(response.data(), &json!({"id": 1}));
    }

    #[test]
    fn test_returned_response_handle_is_sent_as_is() {
        let handler = Handler::new(
            HandlerDescriptor::new("main").param(ParamSpec::new("response")),
            |args| {
                let response = args.response(0)?;
                {
                    let mut guard = response.lock();
                    guard.set_status(201);
                    guard.set_data("created");
                }
                Ok(PhaseResult::Continue(Arg::Response(response)))
            },
        );
        let endpoint = Endpoint::new(Method::POST, "posts", handler);
        let response = endpoint.handle(request()).expect("success");
        assert_eq!(response.status(), 201);
        assert_eq!(response.data(), &json!("created"));
    }

    #[test]
    fn test_respond_in_permission_grants_access() {
        let mut endpoint = Endpoint::new(Method::POST, "posts", returning(json!("main")));
        endpoint
            .permission(Handler::from_fn("grant", || Ok(PhaseResult::Respond(Response::new()))))
            .permission(Handler::from_fn("deny", || {
                Ok(PhaseResult::Fail(ErrorResponse::forbidden("never reached")))
            }));
        assert!(endpoint.permission_callback(request()).is_ok());
    }

    #[test]
    fn test_unhandled_exception_is_500_with_message() {
        let endpoint = Endpoint::new(
            Method::POST,
            "posts",
            Handler::from_fn("main", || Err(Exception::new("Something went wrong"))),
        );
        let error = endpoint.handle(request()).expect_err("unhandled");
        assert_eq!(error.status(), 500);
        assert_eq!(error.message(), "Something went wrong");
    }
}
