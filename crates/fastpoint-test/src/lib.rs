//! # Fastpoint Test
//!
//! Test utilities for Fastpoint, providing an in-memory route table so routers
//! can be registered and exercised without a host.
//!
//! ## Key Features
//!
//! - **Route Table**: [`TestClient`] implements [`RouteRegistrar`](fastpoint_endpoint::RouteRegistrar)
//!   and matches regex routes with named captures
//! - **Request Builder**: Fluent API for query strings, headers, cookies, JSON and form bodies
//! - **Response Assertions**: Helper methods for status codes, bodies and error payloads
//!
//! ## Example
//!
//! ```
//! use fastpoint_core::{ErrorResponse, PhaseResult};
//! use fastpoint_di::Handler;
//! use fastpoint_endpoint::Router;
//! use fastpoint_test::TestClient;
//!
//! let mut router = Router::new("my-api", "v1");
//! router
//!     .get("secret", Handler::from_fn("secret", || Ok(PhaseResult::json("hidden"))))
//!     .permission(Handler::from_fn("deny", || {
//!         Ok(PhaseResult::Fail(ErrorResponse::forbidden("Not enough permissions")))
//!     }));
//!
//! let client = TestClient::from_router(router).unwrap();
//! client
//!     .get("/my-api/v1/secret")
//!     .send()
//!     .unwrap()
//!     .assert_error(403, "Not enough permissions");
//! ```

#![doc(html_root_url = "https://docs.rs/fastpoint-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
