//! Injectables resolved through the test client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fastpoint_core::PhaseResult;
use fastpoint_di::{Handler, Injectable};
use fastpoint_endpoint::Router;
use fastpoint_extract::{HandlerDescriptor, ParamSpec, Schema};
use fastpoint_test::TestClient;
use serde_json::{json, Value};

fn injectors_api(calls: &Arc<AtomicUsize>) -> TestClient {
    let mut router = Router::new("my-injectors", "v1");

    let counter = Arc::clone(calls);
    router.inject(
        "hello_world",
        Handler::from_fn("hello_world", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(PhaseResult::json("Hello World!"))
        }),
        false,
    );
    router.get(
        "hello-world",
        Handler::new(
            HandlerDescriptor::new("greet")
                .param(ParamSpec::new("hello").string().inject_as("hello_world"))
                .param(ParamSpec::new("world").string().inject_as("hello_world")),
            |args| {
                let hello: String = args.get(0)?;
                let world: String = args.get(1)?;
                Ok(PhaseResult::json(hello + &world))
            },
        ),
    );

    // The post is either loaded by number or built from the request body.
    let post = Schema::object(vec![
        ("post_title", Schema::string().required()),
        ("post_status", Schema::string().with_default("draft")),
    ]);
    router.inject(
        "post",
        Handler::new(
            HandlerDescriptor::new("post").param(ParamSpec::new("post").int().class(post)),
            |args| match args.value(0)? {
                Value::Number(id) => Ok(PhaseResult::json(json!({
                    "post_title": format!("Post {id}"),
                    "post_status": "publish",
                    "post_password": "secret",
                }))),
                other => Ok(PhaseResult::json(other.clone())),
            },
        ),
        false,
    );
    router
        .post(
            "post",
            Handler::new(
                HandlerDescriptor::new("retrieve").param(ParamSpec::new("post").object().inject()),
                |args| Ok(PhaseResult::json(args.value(0)?.clone())),
            ),
        )
        .returns(Schema::object(vec![("post_title", Schema::string()), ("post_status", Schema::string())]));

    router.inject("site", Injectable::value(json!({"name": "Fastpoint"})), false);
    router.get(
        "site",
        Handler::new(
            HandlerDescriptor::new("site").param(ParamSpec::new("site").object().inject()),
            |args| Ok(PhaseResult::json(args.value(0)?["name"].clone())),
        ),
    );

    TestClient::from_router(router).expect("injectors router registers")
}

#[test]
fn test_same_injectable_twice_resolves_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = injectors_api(&calls);

    let response = client.get("/my-injectors/v1/hello-world").send().unwrap();
    response.assert_status_code(200);
    assert_eq!(response.body(), "Hello World!Hello World!");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A new request gets a new scope.
    client.get("/my-injectors/v1/hello-world").send().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_post_injectable_by_number() {
    let client = injectors_api(&Arc::new(AtomicUsize::new(0)));
    let response = client.post("/my-injectors/v1/post").query("post", 10).send().unwrap();
    response
        .assert_status_code(200)
        .assert_json(&json!({"post_title": "Post 10", "post_status": "publish"}));
}

#[test]
fn test_post_injectable_from_json_body() {
    let client = injectors_api(&Arc::new(AtomicUsize::new(0)));
    let response = client
        .post("/my-injectors/v1/post")
        .json(&json!({"post_title": "My custom post"}))
        .send()
        .unwrap();
    response
        .assert_status_code(200)
        .assert_json(&json!({"post_title": "My custom post", "post_status": "draft"}));
}

#[test]
fn test_post_injectable_rejects_invalid_body() {
    let client = injectors_api(&Arc::new(AtomicUsize::new(0)));
    let response = client
        .post("/my-injectors/v1/post")
        .json(&json!({"post_status": "publish"}))
        .send()
        .unwrap();
    response.assert_error(422, "Invalid data");
}

#[test]
fn test_literal_injectable() {
    let client = injectors_api(&Arc::new(AtomicUsize::new(0)));
    let response = client.get("/my-injectors/v1/site").send().unwrap();
    assert_eq!(response.body(), "Fastpoint");
}
