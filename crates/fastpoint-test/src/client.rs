//! In-memory route table and dispatcher.

use std::sync::Arc;

use bytes::Bytes;
use fastpoint_core::{ErrorResponse, Params};
use fastpoint_endpoint::{Endpoint, RegisteredRouter, RegistrationError, RouteArgs, RouteRegistrar, Router};
use http::Method;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::debug;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

const NO_ROUTE: &str = "No route was found matching the URL and request method.";

/// One registered route.
#[derive(Debug)]
struct RouteEntry {
    full_route: String,
    pattern: Regex,
    methods: Vec<Method>,
    permission_callback: bool,
    endpoint: Arc<Endpoint>,
}

/// A test client that stands in for the host route table.
///
/// Routers register into it like into any [`RouteRegistrar`]. Requests are
/// matched against the registered route patterns (named groups such as
/// `(?P<id>[\d]+)` become URL parameters), then the permission callback and
/// the endpoint callback run, each with its own scope, as a host would call them.
///
/// # Example
///
/// ```
/// use fastpoint_core::PhaseResult;
/// use fastpoint_di::Handler;
/// use fastpoint_endpoint::Router;
/// use fastpoint_extract::{HandlerDescriptor, ParamSpec};
/// use fastpoint_test::TestClient;
///
/// let mut router = Router::new("my-api", "v1");
/// router.get(
///     "posts/(?P<id>[\\d]+)",
///     Handler::new(HandlerDescriptor::new("show").param(ParamSpec::new("id").int()), |args| {
///         let id: i64 = args.get(0)?;
///         Ok(PhaseResult::json(id))
///     }),
/// );
///
/// let client = TestClient::from_router(router).unwrap();
/// let response = client.get("/my-api/v1/posts/10").send().unwrap();
/// response.assert_status_code(200);
/// assert_eq!(response.body(), &serde_json::json!(10));
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct TestClient {
    routes: Vec<RouteEntry>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client with `router` registered.
    pub fn from_router(router: Router) -> Result<Self, RegistrationError> {
        let mut client = Self::new();
        client.mount(router)?;
        Ok(client)
    }

    /// Registers `router` and returns what it registered.
    pub fn mount(&mut self, router: Router) -> Result<RegisteredRouter, RegistrationError> {
        router.register(self)
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Registered routes as `(method, full route)` pairs, in registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, &str)> {
        self.routes
            .iter()
            .flat_map(|entry| entry.methods.iter().map(move |method| (method.clone(), entry.full_route.as_str())))
            .collect()
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Matches `request` against the route table and runs the endpoint.
    ///
    /// An unmatched path or method gives a `404` response, not an error.
    pub fn dispatch(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let Some((entry, url_params)) = self.find(request.path(), &request.method) else {
            debug!(method = %request.method, path = request.path(), "no route matched");
            return Ok(TestResponse::from_error(&ErrorResponse::new(404, NO_ROUTE)));
        };

        let mut request = request.into_request()?;
        request.set_url_params(url_params);
        let request = Arc::new(request);
        debug!(method = %request.method(), route = %entry.full_route, "dispatching");

        if entry.permission_callback {
            if let Err(error) = entry.endpoint.permission_callback(Arc::clone(&request)) {
                return Ok(TestResponse::from_error(&error));
            }
        }
        Ok(TestResponse::from_result(entry.endpoint.callback(request)))
    }

    fn find(&self, path: &str, method: &Method) -> Option<(&RouteEntry, Params)> {
        let path = untrailed(path);
        self.routes
            .iter()
            .filter(|entry| entry.methods.contains(method))
            .find_map(|entry| {
                let captures = entry.pattern.captures(path)?;
                let params = entry
                    .pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        let value = captures.name(name)?;
                        Some((name.to_string(), Value::String(value.as_str().to_string())))
                    })
                    .collect();
                Some((entry, params))
            })
    }
}

impl RouteRegistrar for TestClient {
    fn register_route(
        &mut self,
        namespace: &str,
        route: &str,
        args: RouteArgs,
        endpoint: Arc<Endpoint>,
        override_existing: bool,
    ) -> Result<(), RegistrationError> {
        let full_route = format!("/{}/{}", namespace.trim_matches('/'), route.trim_matches('/'));
        let pattern = RegexBuilder::new(&format!("^{}$", untrailed(&full_route)))
            .case_insensitive(true)
            .build()
            .map_err(|e| RegistrationError::Rejected {
                route: full_route.clone(),
                reason: e.to_string(),
            })?;

        let methods = args
            .methods
            .split(',')
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .map(|method| {
                Method::from_bytes(method.to_uppercase().as_bytes()).map_err(|e| RegistrationError::Rejected {
                    route: full_route.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if override_existing {
            self.routes.retain(|entry| entry.full_route != full_route);
        }
        debug!(route = %full_route, methods = %args.methods, "route added");
        self.routes.push(RouteEntry {
            full_route,
            pattern,
            methods,
            permission_callback: args.permission_callback,
            endpoint,
        });
        Ok(())
    }
}

/// Drops a trailing slash, keeping a lone `/`.
fn untrailed(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// A request builder bound to a test client.
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Adds a cookie.
    pub fn cookie(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.cookie(name, value);
        self
    }

    /// Appends a query string parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as a url-encoded form.
    pub fn form<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Builds and dispatches the request.
    pub fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.dispatch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastpoint_core::PhaseResult;
    use fastpoint_di::Handler;

    fn ok(value: &'static str) -> Handler {
        Handler::from_fn("ok", move || Ok(PhaseResult::json(value)))
    }

    #[test]
    fn test_unmatched_route_is_404() {
        let client = TestClient::new();
        client
            .get("/nothing/here")
            .send()
            .unwrap()
            .assert_error(404, NO_ROUTE);
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new("api", "v1");
        router.get("posts", ok("list"));
        let client = TestClient::from_router(router).unwrap();

        client.get("/api/v1/posts").send().unwrap().assert_status_code(200);
        client.delete("/api/v1/posts").send().unwrap().assert_status_code(404);
        assert_eq!(client.routes(), vec![(Method::GET, "/api/v1/posts")]);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let mut router = Router::new("api", "v1");
        router.post("/", ok("created"));
        let client = TestClient::from_router(router).unwrap();

        assert_eq!(client.post("/api/v1").send().unwrap().body(), "created");
        assert_eq!(client.post("/api/v1/").send().unwrap().body(), "created");
    }

    #[test]
    fn test_override_replaces_route() {
        let mut client = TestClient::new();

        let mut first = Router::new("api", "v1");
        first.get("posts", ok("first"));
        client.mount(first).unwrap();

        let mut second = Router::new("api", "v1");
        second.get("posts", ok("second"));
        client.mount(second).unwrap();
        // Without override the earlier registration keeps serving.
        assert_eq!(client.get("/api/v1/posts").send().unwrap().body(), "first");

        let mut third = Router::new("api", "v1");
        third.get("posts", ok("third")).override_existing(true);
        client.mount(third).unwrap();
        assert_eq!(client.get("/api/v1/posts").send().unwrap().body(), "third");
        assert_eq!(client.routes().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut router = Router::new("api", "v1");
        router.get("posts/(?P<id>[", ok("never"));
        let error = TestClient::from_router(router).unwrap_err();
        assert!(matches!(error, RegistrationError::Rejected { ref route, .. } if route == "/api/v1/posts/(?P<id>["));
    }
}
