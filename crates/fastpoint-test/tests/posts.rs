//! End-to-end tests through the test client.
//!
//! A small posts API backed by an in-memory store: a `post` injectable that
//! loads by URL id, capability checked updates and deletes, and a response
//! schema that hides every field but the public ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use fastpoint_core::{ErrorResponse, Exception, ExceptionClass, PhaseResult};
use fastpoint_di::{Handler, Injectable};
use fastpoint_endpoint::Router;
use fastpoint_extract::{HandlerDescriptor, ParamSpec, Schema};
use fastpoint_test::TestClient;
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Posts {
    rows: Arc<Mutex<BTreeMap<i64, Value>>>,
}

impl Posts {
    fn seeded() -> Self {
        let posts = Self::default();
        posts.rows.lock().insert(
            1,
            json!({
                "ID": 1,
                "post_author": 7,
                "post_title": "My custom post",
                "post_status": "publish",
                "post_password": "secret",
            }),
        );
        posts
    }

    fn insert(&self, mut post: Value) -> Value {
        let mut rows = self.rows.lock();
        let id = rows.keys().next_back().map_or(1, |last| last + 1);
        post["ID"] = json!(id);
        rows.insert(id, post.clone());
        post
    }
}

fn post_schema() -> Schema {
    Schema::object(vec![
        ("post_author", Schema::integer()),
        ("post_title", Schema::string()),
        ("post_status", Schema::string()),
    ])
}

fn new_post_schema() -> Schema {
    Schema::object(vec![
        ("post_author", Schema::integer().with_default(0)),
        ("post_title", Schema::string().min_length(1).required()),
        ("post_status", Schema::string().with_default("draft")),
    ])
}

/// Capabilities: everybody reads, only post 1 may be edited, nothing may be deleted.
fn capabilities(capability: &str, args: &[Value]) -> bool {
    match capability {
        "read" => true,
        "edit_post" => args == [json!("1")],
        _ => false,
    }
}

fn posts_api(posts: &Posts) -> TestClient {
    let not_found = ExceptionClass::new("PostNotFound");
    let checker = Arc::new(capabilities);

    let mut router = Router::new("my-posts", "v1");
    router.inject("posts", Injectable::service(posts.clone()), false);
    router.inject(
        "post",
        {
            let not_found = not_found.clone();
            Handler::new(
                HandlerDescriptor::new("load_post")
                    .param(ParamSpec::new("ID").int())
                    .param(ParamSpec::new("posts").inject()),
                move |args| {
                    let id: i64 = args.get(0)?;
                    let posts = args.service::<Posts>(1)?;
                    let post = posts.rows.lock().get(&id).cloned();
                    post.map(PhaseResult::json)
                        .ok_or_else(|| Exception::of(&not_found, format!("Post {id} not found")))
                }
            )
        },
        false,
    );
    router.on_exception(
        &not_found,
        Handler::new(HandlerDescriptor::new("to_404").param(ParamSpec::new("exception")), |args| {
            let exception = args.exception(0)?;
            Ok(PhaseResult::Fail(ErrorResponse::new(404, exception.message())))
        }),
        false,
    );

    router
        .get(
            "(?P<ID>[\\d]+)",
            Handler::new(
                HandlerDescriptor::new("show").param(ParamSpec::new("post").object().inject()),
                |args| Ok(PhaseResult::json(args.value(0)?.clone())),
            ),
        )
        .has_cap(checker.clone(), "read", vec![])
        .returns(post_schema());

    router
        .post(
            "/",
            Handler::new(
                HandlerDescriptor::new("create")
                    .param(ParamSpec::new("post").class(new_post_schema()))
                    .param(ParamSpec::new("posts").inject())
                    .param(ParamSpec::new("response")),
                |args| {
                    let post = args.value(0)?.clone();
                    let created = args.service::<Posts>(1)?.insert(post);
                    args.response(2)?.lock().set_status(201);
                    Ok(PhaseResult::json(created))
                },
            ),
        )
        .returns(post_schema());

    router
        .put(
            "(?P<ID>[\\d]+)",
            Handler::new(
                HandlerDescriptor::new("update")
                    .param(ParamSpec::new("ID").int())
                    .param(ParamSpec::new("post_title").string())
                    .param(ParamSpec::new("posts").inject())
                    .param(ParamSpec::new("response")),
                |args| {
                    let id: i64 = args.get(0)?;
                    let title: String = args.get(1)?;
                    if let Some(post) = args.service::<Posts>(2)?.rows.lock().get_mut(&id) {
                        post["post_title"] = json!(title);
                    }
                    args.response(3)?.lock().set_status(204);
                    Ok(PhaseResult::null())
                },
            ),
        )
        .has_cap(checker.clone(), "edit_post", vec![json!("<ID>")]);

    router
        .delete(
            "(?P<ID>[\\d]+)",
            Handler::new(
                HandlerDescriptor::new("destroy")
                    .param(ParamSpec::new("ID").int())
                    .param(ParamSpec::new("posts").inject()),
                |args| {
                    let id: i64 = args.get(0)?;
                    let removed = args.service::<Posts>(1)?.rows.lock().remove(&id);
                    Ok(PhaseResult::json(removed.is_some()))
                },
            ),
        )
        .has_cap(checker, "delete_post", vec![json!("<ID>")]);

    TestClient::from_router(router).expect("posts router registers")
}

#[test]
fn test_retrieve_post_hides_private_fields() {
    let posts = Posts::seeded();
    let client = posts_api(&posts);

    let response = client.get("/my-posts/v1/1").send().unwrap();
    response.assert_status_code(200).assert_json(&json!({
        "post_author": 7,
        "post_title": "My custom post",
        "post_status": "publish",
    }));
}

#[test]
fn test_retrieve_missing_post_is_mapped_to_404() {
    let client = posts_api(&Posts::seeded());
    client
        .get("/my-posts/v1/42")
        .send()
        .unwrap()
        .assert_error(404, "Post 42 not found");
}

#[test]
fn test_non_numeric_id_does_not_match() {
    let client = posts_api(&Posts::seeded());
    client.get("/my-posts/v1/abc").send().unwrap().assert_status_code(404);
}

#[test]
fn test_create_from_json_body() {
    let posts = Posts::seeded();
    let client = posts_api(&posts);

    let response = client
        .post("/my-posts/v1")
        .json(&json!({"post_title": "Hello", "post_author": "3", "unknown": true}))
        .send()
        .unwrap();
    response.assert_status_code(201).assert_json(&json!({
        "post_author": 3,
        "post_title": "Hello",
        "post_status": "draft",
    }));
    assert_eq!(posts.rows.lock().len(), 2);
    assert!(posts.rows.lock()[&2].get("unknown").is_none());
}

#[test]
fn test_create_from_form_body() {
    let posts = Posts::seeded();
    let client = posts_api(&posts);

    let response = client
        .post("/my-posts/v1")
        .form(&[("post_title", "From a form"), ("post_status", "publish")])
        .send()
        .unwrap();
    response.assert_status_code(201);
    assert_eq!(response.body()["post_title"], json!("From a form"));
    assert_eq!(response.body()["post_status"], json!("publish"));
}

#[test]
fn test_create_without_title_is_invalid() {
    let posts = Posts::seeded();
    let client = posts_api(&posts);

    let response = client.post("/my-posts/v1").json(&json!({"post_status": "publish"})).send().unwrap();
    response.assert_error(422, "Invalid data");
    let errors = response.body()["data"]["errors"].as_array().cloned().unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], json!("post.post_title"));
    assert_eq!(posts.rows.lock().len(), 1);
}

#[test]
fn test_update_requires_capability_for_that_post() {
    let posts = Posts::seeded();
    posts.insert(json!({"post_title": "Second"}));
    let client = posts_api(&posts);

    let response = client
        .put("/my-posts/v1/1")
        .query("post_title", "Renamed")
        .send()
        .unwrap();
    response.assert_status_code(204);
    assert_eq!(posts.rows.lock()[&1]["post_title"], json!("Renamed"));

    client
        .put("/my-posts/v1/2")
        .query("post_title", "Renamed")
        .send()
        .unwrap()
        .assert_error(403, "Not enough permissions");
    assert_eq!(posts.rows.lock()[&2]["post_title"], json!("Second"));
}

#[test]
fn test_delete_is_forbidden() {
    let posts = Posts::seeded();
    let client = posts_api(&posts);

    client
        .delete("/my-posts/v1/1")
        .send()
        .unwrap()
        .assert_error(403, "Not enough permissions");
    assert_eq!(posts.rows.lock().len(), 1);
}

#[test]
fn test_routes_are_listed() {
    let client = posts_api(&Posts::default());
    let routes: Vec<String> = client
        .routes()
        .into_iter()
        .map(|(method, route)| format!("{method} {route}"))
        .collect();
    assert_eq!(
        routes,
        vec![
            "GET /my-posts/v1/(?P<ID>[\\d]+)",
            "POST /my-posts/v1/",
            "PUT /my-posts/v1/(?P<ID>[\\d]+)",
            "DELETE /my-posts/v1/(?P<ID>[\\d]+)",
        ]
    );
}
