//! Router registration integration tests.

use std::sync::Arc;

use fastpoint_core::{ErrorResponse, Exception, ExceptionClass, PhaseResult, Request};
use fastpoint_di::{Handler, Injectable};
use fastpoint_endpoint::{Endpoint, Extensions, RegistrationError, RouteArgs, RouteRegistrar, Router};
use fastpoint_extract::{HandlerDescriptor, ParamSpec};
use http::Method;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

/// One call the host route table received.
#[derive(Debug, Clone)]
struct Registration {
    namespace: String,
    route: String,
    args: RouteArgs,
    override_existing: bool,
}

#[derive(Default)]
struct RecordingRegistrar {
    calls: Vec<Registration>,
    endpoints: Vec<Arc<Endpoint>>,
}

impl RecordingRegistrar {
    fn routes(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|call| format!("{} {}", call.namespace, call.route))
            .collect()
    }

    fn endpoint(&self, full_route: &str) -> &Arc<Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.full_route() == full_route)
            .unwrap_or_else(|| panic!("no endpoint {full_route}"))
    }
}

impl RouteRegistrar for RecordingRegistrar {
    fn register_route(
        &mut self,
        namespace: &str,
        route: &str,
        args: RouteArgs,
        endpoint: Arc<Endpoint>,
        override_existing: bool,
    ) -> Result<(), RegistrationError> {
        self.calls.push(Registration {
            namespace: namespace.to_string(),
            route: route.to_string(),
            args,
            override_existing,
        });
        self.endpoints.push(endpoint);
        Ok(())
    }
}

/// A registrar that refuses every route.
struct Refusing;

impl RouteRegistrar for Refusing {
    fn register_route(
        &mut self,
        _namespace: &str,
        route: &str,
        _args: RouteArgs,
        _endpoint: Arc<Endpoint>,
        _override_existing: bool,
    ) -> Result<(), RegistrationError> {
        Err(RegistrationError::Rejected {
            route: route.to_string(),
            reason: "route already exists".to_string(),
        })
    }
}

fn ok() -> Handler {
    Handler::from_fn("ok", || Ok(PhaseResult::json(true)))
}

fn site_echo() -> Handler {
    Handler::new(
        HandlerDescriptor::new("site").param(ParamSpec::new("site").string().inject()),
        |args| Ok(PhaseResult::json(args.value(0)?.clone())),
    )
}

#[test]
fn test_root_then_sub_routers() {
    let mut posts = Router::new("posts", "");
    posts.get("(?P<id>[\\d]+)", ok());

    let mut users = Router::new("users", "");
    users.get("", ok());

    let mut root = Router::new("my-api", "v1");
    root.get("status", ok());
    root.include_router(posts).include_router(users);

    let mut registrar = RecordingRegistrar::default();
    let registered = root.register(&mut registrar).expect("registers");

    assert_eq!(
        registrar.routes(),
        vec!["my-api/v1 /status", "my-api/v1 posts/(?P<id>[\\d]+)", "my-api/v1 users/"]
    );
    assert_eq!(
        registered.full_routes().collect::<Vec<_>>(),
        vec!["/my-api/v1/status", "/my-api/v1/posts/(?P<id>[\\d]+)", "/my-api/v1/users"]
    );
    assert_eq!(registered.skipped(), 0);
}

#[test]
fn test_root_requires_namespace_and_version() {
    let mut registrar = RecordingRegistrar::default();

    let error = Router::new("", "v1").register(&mut registrar).expect_err("no namespace");
    assert_eq!(error, RegistrationError::MissingNamespace);

    let error = Router::new("my-api", "").register(&mut registrar).expect_err("no version");
    assert_eq!(error, RegistrationError::MissingVersion);
    assert!(registrar.calls.is_empty());
}

#[test]
fn test_generated_route_args() {
    let mut root = Router::new("my-api", "v1");
    root.depends(["buddypress"]);
    root.post("posts", ok())
        .permission(ok())
        .args(Map::from_iter([("show_in_index".to_string(), json!(false))]))
        .override_existing(true);

    let mut registrar = RecordingRegistrar::default();
    root.register(&mut registrar).expect("registers");

    let call = &registrar.calls[0];
    assert_eq!(call.args.methods, "POST");
    assert!(call.args.permission_callback);
    assert_eq!(call.args.depends, Some(vec!["buddypress".to_string()]));
    assert_eq!(call.args.extra["show_in_index"], json!(false));
    assert!(call.override_existing);
}

#[test]
fn test_override_routes_flows_down_the_tree() {
    let mut users = Router::new("users", "");
    users.get("", ok());

    let mut root = Router::new("my-api", "v1").with_override_routes(true);
    root.get("status", ok());
    root.include_router(users);

    let mut registrar = RecordingRegistrar::default();
    root.register(&mut registrar).expect("registers");
    assert_eq!(registrar.calls.len(), 2);
    assert!(registrar.calls.iter().all(|call| call.override_existing));
}

#[test]
fn test_registrar_rejection_is_returned() {
    let mut root = Router::new("my-api", "v1");
    root.get("posts", ok());

    let error = root.register(&mut Refusing).expect_err("rejected");
    assert_eq!(error.to_string(), "Unable to register route /posts: route already exists");
}

#[test]
fn test_empty_capability_fails_registration() {
    let mut root = Router::new("my-api", "v1");
    root.get("posts", ok())
        .has_cap(Arc::new(|_: &str, _: &[Value]| true), "", vec![]);

    let error = root.register(&mut RecordingRegistrar::default()).expect_err("empty capability");
    assert!(matches!(error, RegistrationError::EmptyCapability { ref route } if route == "posts"));
}

#[test]
fn test_more_specific_entries_win() {
    let not_found = ExceptionClass::new("NotFound");

    let mut posts = Router::new("posts", "");
    posts.inject("site", Injectable::value("sub-router"), false);
    posts.get("from-sub", site_echo());
    posts
        .get("from-endpoint", site_echo())
        .inject("site", Injectable::value("endpoint"), false);
    posts
        .get("missing", Handler::from_fn("missing", move || Err(Exception::of(&not_found, "no such post"))))
        .on_exception(
            &ExceptionClass::base(),
            Handler::from_fn("endpoint_handler", || Ok(PhaseResult::Fail(ErrorResponse::new(404, "from endpoint")))),
            false,
        );

    let mut root = Router::new("my-api", "v1");
    root.inject("site", Injectable::value("root"), false);
    root.on_exception(
        &ExceptionClass::base(),
        Handler::from_fn("root_handler", || Ok(PhaseResult::Fail(ErrorResponse::new(500, "from root")))),
        false,
    );
    root.get("from-root", site_echo());
    root.include_router(posts);

    let mut registrar = RecordingRegistrar::default();
    root.register(&mut registrar).expect("registers");

    let served = |full_route: &str| {
        registrar
            .endpoint(full_route)
            .handle(Arc::new(Request::new(Method::GET, full_route)))
    };
    assert_eq!(served("/my-api/v1/from-root").expect("ok").data(), &json!("root"));
    assert_eq!(served("/my-api/v1/posts/from-sub").expect("ok").data(), &json!("sub-router"));
    assert_eq!(served("/my-api/v1/posts/from-endpoint").expect("ok").data(), &json!("endpoint"));

    let error = served("/my-api/v1/posts/missing").expect_err("mapped");
    assert_eq!(error.status(), 404);
    assert_eq!(error.message(), "from endpoint");
}

#[test]
fn test_plugins_flow_down_the_tree() {
    let mut users = Router::new("users", "");
    users.depends(["buddypress"]);
    users.get("", ok()).depends(["woocommerce"]);

    let mut root = Router::new("my-api", "v1");
    root.depends(["buddypress"]);
    root.include_router(users);

    let mut registrar = RecordingRegistrar::default();
    root.register(&mut registrar).expect("registers");
    assert_eq!(
        registrar.calls[0].args.depends,
        Some(vec!["woocommerce".to_string(), "buddypress".to_string()])
    );
}

/// Records which hooks ran and rewrites names.
#[derive(Default)]
struct Hooks {
    events: Mutex<Vec<String>>,
}

impl Extensions for Hooks {
    fn endpoint_args(&self, args: RouteArgs, _namespace: &str, _rest_base: &str, endpoint: &Endpoint) -> Option<RouteArgs> {
        (endpoint.route() != "hidden").then_some(args)
    }

    fn endpoint_route(&self, route: String, _endpoint: &Endpoint) -> String {
        route.to_lowercase()
    }

    fn is_to_register(&self, router: &Router) -> bool {
        router.base() != "internal"
    }

    fn router_namespace(&self, namespace: String, _router: &Router) -> String {
        format!("{namespace}-beta")
    }

    fn router_rest_base(&self, rest_base: String, _router: &Router) -> String {
        format!("{rest_base}s")
    }

    fn before_register(&self, router: &Router) {
        self.events.lock().push(format!("before {}", router.namespace()));
    }

    fn after_register(&self, router: &Router) {
        self.events.lock().push(format!("after {}", router.namespace()));
    }
}

#[test]
fn test_registration_hooks() {
    let hooks = Arc::new(Hooks::default());

    let mut internal = Router::new("internal", "");
    internal.get("debug", ok());
    let mut user = Router::new("user", "");
    user.get("Profile", ok());

    let mut root = Router::new("my-api", "v1").with_extensions(hooks.clone());
    root.get("Status", ok());
    root.get("hidden", ok());
    root.include_router(internal).include_router(user);

    let mut registrar = RecordingRegistrar::default();
    let registered = root.register(&mut registrar).expect("registers");

    assert_eq!(registrar.routes(), vec!["my-api/v1-beta /status", "my-api/v1 users/profile"]);
    // One hidden endpoint and one skipped router.
    assert_eq!(registered.skipped(), 2);
    assert_eq!(*hooks.events.lock(), vec!["before my-api/v1", "after my-api/v1"]);
}

#[test]
fn test_skipped_root_registers_nothing() {
    struct Never;
    impl Extensions for Never {
        fn is_to_register(&self, _router: &Router) -> bool {
            false
        }
    }

    let mut root = Router::new("my-api", "v1").with_extensions(Arc::new(Never));
    root.get("posts", ok());

    let mut registrar = RecordingRegistrar::default();
    let registered = root.register(&mut registrar).expect("skipping is not an error");
    assert!(registered.is_empty());
    assert_eq!(registered.skipped(), 1);
    assert!(registrar.calls.is_empty());
}
