//! # Fastpoint Endpoint
//!
//! Endpoints, their request lifecycle and the router trees that register them.
//!
//! - [`Endpoint`] - A route served by a handler, plus permission handlers,
//!   middleware, response schemas and exception handlers
//! - [`Router`] - A tree of endpoints sharing a namespace, injectables and
//!   exception handlers
//! - [`RouteRegistrar`] - The host route table endpoints are registered with
//! - [`Extensions`] - Application hooks for registration and error shaping
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fastpoint_core::{ErrorResponse, Exception, ExceptionClass, PhaseResult, Request};
//! use fastpoint_di::Handler;
//! use fastpoint_endpoint::Endpoint;
//! use http::Method;
//!
//! let mut endpoint = Endpoint::new(
//!     Method::POST,
//!     "handler",
//!     Handler::from_fn("main", || Err(Exception::new("Something went wrong"))),
//! );
//! endpoint.on_exception(
//!     &ExceptionClass::base(),
//!     Handler::from_fn("on_error", || Ok(PhaseResult::Fail(ErrorResponse::new(570, "Exception handler")))),
//!     false,
//! );
//!
//! let error = endpoint.handle(Arc::new(Request::new(Method::POST, "/handler"))).unwrap_err();
//! assert_eq!(error.status(), 570);
//! ```

#![doc(html_root_url = "https://docs.rs/fastpoint-endpoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod error;
mod exceptions;
mod extensions;
mod middleware;
mod permission;
mod registrar;
mod response;
mod router;

pub use endpoint::Endpoint;
pub use error::RegistrationError;
pub use exceptions::ExceptionHandlerTable;
pub use extensions::{ErrorCause, Extensions, NoExtensions};
pub use middleware::{HandlerMiddleware, Middleware};
pub use permission::CapabilityChecker;
pub use registrar::{RouteArgs, RouteRegistrar};
pub use response::ResponseSchema;
pub use router::{RegisteredRoute, RegisteredRouter, Router};
