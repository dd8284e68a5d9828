//! Router trees.
//!
//! A root router owns the API namespace (`base/version`). Sub-routers add a
//! rest base of their own under the root namespace. When the root is
//! registered, plugins, injectables and exception handlers flow down the
//! tree; anything a sub-router or endpoint declares itself takes precedence.

use std::sync::Arc;

use http::Method;
use tracing::info;

use fastpoint_core::ExceptionClass;
use fastpoint_di::{Handler, Injectable, InjectableRegistry};
use fastpoint_extract::{Serializer, Validator};

use crate::endpoint::Endpoint;
use crate::error::RegistrationError;
use crate::exceptions::ExceptionHandlerTable;
use crate::extensions::{Extensions, NoExtensions};
use crate::registrar::RouteRegistrar;

/// A route handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRoute {
    /// HTTP method.
    pub method: Method,
    /// Route including the namespace, e.g. `/my-api/v1/posts`.
    pub full_route: String,
}

/// Outcome of [`Router::register`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredRouter {
    routes: Vec<RegisteredRoute>,
    skipped: usize,
}

impl RegisteredRouter {
    /// Routes registered, in registration order.
    #[must_use]
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    /// Full routes registered, in registration order.
    pub fn full_routes(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.full_route.as_str())
    }

    /// Number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of endpoints and routers the extensions chose to skip.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

/// A group of endpoints sharing a namespace, injectables and exception handlers.
///
/// # Example
///
/// ```rust
/// use fastpoint_core::PhaseResult;
/// use fastpoint_di::Handler;
/// use fastpoint_endpoint::Router;
///
/// let mut router = Router::new("my-api", "v1");
/// router.get("posts", Handler::from_fn("list_posts", || Ok(PhaseResult::json(Vec::<i64>::new()))));
///
/// let mut users = Router::new("users", "");
/// users.get("(?P<id>[\\d]+)", Handler::from_fn("get_user", || Ok(PhaseResult::null())));
/// router.include_router(users);
/// assert_eq!(router.namespace(), "my-api/v1");
/// ```
pub struct Router {
    base: String,
    version: String,
    endpoints: Vec<Endpoint>,
    sub_routers: Vec<Router>,
    plugins: Option<Vec<String>>,
    injectables: InjectableRegistry,
    exception_handlers: ExceptionHandlerTable,
    validator: Option<Arc<dyn Validator>>,
    serializer: Option<Arc<dyn Serializer>>,
    extensions: Option<Arc<dyn Extensions>>,
    override_routes: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new("api", "")
    }
}

impl Router {
    /// Creates a router.
    ///
    /// For a root router `base` and `version` form the namespace; for a
    /// sub-router they form its rest base.
    pub fn new(base: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            version: version.into(),
            endpoints: Vec::new(),
            sub_routers: Vec::new(),
            plugins: None,
            injectables: InjectableRegistry::new(),
            exception_handlers: ExceptionHandlerTable::new(),
            validator: None,
            serializer: None,
            extensions: None,
            override_routes: false,
        }
    }

    /// Sets the validator used by every endpoint of this tree.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the serializer used by every endpoint of this tree.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the extensions used by every endpoint of this tree.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Arc<dyn Extensions>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Makes every endpoint of this tree replace routes already registered
    /// under the same path.
    #[must_use]
    pub fn with_override_routes(mut self, override_routes: bool) -> Self {
        self.override_routes = override_routes;
        self
    }

    /// Adds an endpoint.
    pub fn endpoint(&mut self, method: Method, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        let index = self.endpoints.len();
        self.endpoints.push(Endpoint::new(method, route, handler));
        &mut self.endpoints[index]
    }

    /// Adds a `GET` endpoint.
    pub fn get(&mut self, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        self.endpoint(Method::GET, route, handler)
    }

    /// Adds a `POST` endpoint.
    pub fn post(&mut self, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        self.endpoint(Method::POST, route, handler)
    }

    /// Adds a `PUT` endpoint.
    pub fn put(&mut self, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        self.endpoint(Method::PUT, route, handler)
    }

    /// Adds a `PATCH` endpoint.
    pub fn patch(&mut self, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        self.endpoint(Method::PATCH, route, handler)
    }

    /// Adds a `DELETE` endpoint.
    pub fn delete(&mut self, route: impl Into<String>, handler: Handler) -> &mut Endpoint {
        self.endpoint(Method::DELETE, route, handler)
    }

    /// Nests `router` under this one.
    pub fn include_router(&mut self, router: Router) -> &mut Self {
        self.sub_routers.push(router);
        self
    }

    /// Registers an injectable for every endpoint of this tree.
    pub fn inject(&mut self, name: impl Into<String>, entry: impl Into<Injectable>, override_existing: bool) -> &mut Self {
        self.injectables.register(name, entry, override_existing);
        self
    }

    /// Registers an exception handler for every endpoint of this tree.
    pub fn on_exception(&mut self, class: &ExceptionClass, handler: Handler, override_existing: bool) -> &mut Self {
        self.exception_handlers.insert(class, handler, override_existing);
        self
    }

    /// Declares plugins every endpoint of this tree depends on.
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

    /// The base.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `base/version` with surrounding slashes removed, before any extension runs.
    #[must_use]
    pub fn namespace(&self) -> String {
        let mut namespace = self.base.trim_matches('/').to_string();
        if !self.version.is_empty() {
            namespace.push('/');
            namespace.push_str(self.version.trim_matches('/'));
        }
        namespace
    }

    /// Endpoints not yet registered.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Nested routers.
    #[must_use]
    pub fn sub_routers(&self) -> &[Router] {
        &self.sub_routers
    }

    /// Plugins every endpoint of this tree depends on.
    #[must_use]
    pub fn plugins(&self) -> Option<&[String]> {
        self.plugins.as_deref()
    }

    /// Registers this router, as the root of its tree, with `registrar`.
    pub fn register(mut self, registrar: &mut dyn RouteRegistrar) -> Result<RegisteredRouter, RegistrationError> {
        let extensions = self.extensions.clone().unwrap_or_else(|| Arc::new(NoExtensions));
        let mut registered = RegisteredRouter::default();

        if !extensions.is_to_register(&self) {
            info!(router = %self.namespace(), "router registration skipped");
            registered.skipped += 1;
            return Ok(registered);
        }
        if self.base.is_empty() {
            return Err(RegistrationError::MissingNamespace);
        }
        if self.version.is_empty() {
            return Err(RegistrationError::MissingVersion);
        }

        extensions.before_register(&self);

        let namespace = self.namespace();
        let filtered = extensions.router_namespace(namespace.clone(), &self);
        self.register_endpoints(registrar, &filtered, "", &extensions, &mut registered)?;
        self.register_sub_routers(registrar, &namespace, &mut registered)?;

        extensions.after_register(&self);
        info!(namespace = %filtered, routes = registered.len(), "router registered");
        Ok(registered)
    }

    fn register_sub_routers(
        &mut self,
        registrar: &mut dyn RouteRegistrar,
        namespace: &str,
        registered: &mut RegisteredRouter,
    ) -> Result<(), RegistrationError> {
        let mut sub_routers = std::mem::take(&mut self.sub_routers);
        for sub in &mut sub_routers {
            sub.inherit_from(self);
            sub.register_as_sub(registrar, namespace, registered)?;
        }
        self.sub_routers = sub_routers;
        Ok(())
    }

    fn register_as_sub(
        &mut self,
        registrar: &mut dyn RouteRegistrar,
        namespace: &str,
        registered: &mut RegisteredRouter,
    ) -> Result<(), RegistrationError> {
        let extensions = self.extensions.clone().unwrap_or_else(|| Arc::new(NoExtensions));
        if !extensions.is_to_register(self) {
            info!(router = %self.namespace(), "sub-router registration skipped");
            registered.skipped += 1;
            return Ok(());
        }

        let rest_base = extensions.router_rest_base(self.namespace(), self);
        self.register_endpoints(registrar, namespace, &rest_base, &extensions, registered)?;
        self.register_sub_routers(registrar, namespace, registered)
    }

    fn inherit_from(&mut self, parent: &Router) {
        if let Some(plugins) = &parent.plugins {
            self.depends(plugins.iter().cloned());
        }
        self.injectables.merge_missing(&parent.injectables);
        self.exception_handlers.merge_missing(&parent.exception_handlers);
        if self.validator.is_none() {
            self.validator.clone_from(&parent.validator);
        }
        if self.serializer.is_none() {
            self.serializer.clone_from(&parent.serializer);
        }
        if self.extensions.is_none() {
            self.extensions.clone_from(&parent.extensions);
        }
        self.override_routes |= parent.override_routes;
    }

    fn register_endpoints(
        &mut self,
        registrar: &mut dyn RouteRegistrar,
        namespace: &str,
        rest_base: &str,
        extensions: &Arc<dyn Extensions>,
        registered: &mut RegisteredRouter,
    ) -> Result<(), RegistrationError> {
        for mut endpoint in std::mem::take(&mut self.endpoints) {
            endpoint.inherit(self.plugins.as_deref(), &self.injectables, &self.exception_handlers);
            endpoint.set_collaborators(self.validator.clone(), self.serializer.clone(), Arc::clone(extensions));

            let Some((route, args)) = endpoint.register(namespace, rest_base)? else {
                registered.skipped += 1;
                continue;
            };
            let entry = RegisteredRoute {
                method: endpoint.method().clone(),
                full_route: endpoint.full_route().to_string(),
            };
            let override_existing = self.override_routes || endpoint.overrides_existing();
            registrar.register_route(namespace, &route, args, Arc::new(endpoint), override_existing)?;
            registered.routes.push(entry);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.base)
            .field("version", &self.version)
            .field("endpoints", &self.endpoints)
            .field("sub_routers", &self.sub_routers)
            .field("plugins", &self.plugins)
            .field("override_routes", &self.override_routes)
            .finish_non_exhaustive()
    }
}
