use http::Method;

/// The endpoint a request is being served by.
///
/// `full_route` is the bare route until the endpoint is registered, after which
/// it becomes `/{namespace}/{route}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    method: Method,
    route: String,
    full_route: String,
}

impl RouteInfo {
    /// Creates route info for an endpoint that is not registered yet.
    #[must_use]
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        let route = route.into();
        Self {
            method,
            full_route: route.clone(),
            route,
        }
    }

    /// Returns a copy with the registered full route.
    #[must_use]
    pub fn with_full_route(mut self, full_route: impl Into<String>) -> Self {
        self.full_route = full_route.into();
        self
    }

    /// HTTP method served.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Route as declared on the router.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Route including namespace and rest base.
    #[must_use]
    pub fn full_route(&self) -> &str {
        &self.full_route
    }
}
