//! # Fastpoint DI
//!
//! Builds the argument list of a handler and calls it.
//!
//! Resolution runs a [`ResolverChain`] of three stages, each filling only the
//! slots earlier stages left empty:
//!
//! 1. [`StaticResolver`] - request, response, endpoint and exception objects
//! 2. [`InjectResolver`] - parameters marked as injected, via the [`InjectableRegistry`]
//! 3. [`ValidationResolver`] - request data, located lazily and coerced to the declared type
//!
//! Injectables are either literal values or resolver handlers. Resolvers go
//! through the same [`Invoker`], so they may depend on request data, context
//! objects and other injectables. Each resolver runs at most once per request
//! and cycles are reported instead of recursing forever.
//!
//! ```rust
//! use std::sync::Arc;
//! use fastpoint_core::{PhaseResult, Request, RouteInfo};
//! use fastpoint_di::{CallContext, Handler, Injectable, InjectableRegistry, InvocationScope, Invoker};
//! use fastpoint_extract::{DefaultValidator, HandlerDescriptor, ParamSpec};
//! use http::Method;
//!
//! let mut registry = InjectableRegistry::new();
//! registry.register("greeting", Injectable::value("Hello"), false);
//!
//! let handler = Handler::new(
//!     HandlerDescriptor::new("greet")
//!         .param(ParamSpec::new("greeting").string().inject())
//!         .param(ParamSpec::new("name").string()),
//!     |args| {
//!         let greeting: String = args.get(0)?;
//!         let name: String = args.get(1)?;
//!         Ok(PhaseResult::json(format!("{greeting} {name}")))
//!     },
//! );
//!
//! let request = Arc::new(Request::new(Method::GET, "/").with_query_param("name", "Ada"));
//! let mut scope = InvocationScope::new();
//! let mut ctx = CallContext::new(
//!     request,
//!     Arc::new(RouteInfo::new(Method::GET, "/greet")),
//!     Arc::new(registry),
//!     Arc::new(DefaultValidator::new()),
//!     &mut scope,
//! );
//!
//! let result = Invoker::new().call(&handler, &mut ctx).unwrap();
//! assert!(matches!(result, PhaseResult::Continue(arg) if arg.as_value() == Some(&"Hello Ada".into())));
//! ```

#![doc(html_root_url = "https://docs.rs/fastpoint-di/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod error;
mod handler;
mod invoker;
mod registry;
mod resolved;
mod scope;
pub mod stages;

pub use chain::ResolverChain;
pub use error::InvokeError;
pub use handler::{Handler, HandlerFn};
pub use invoker::Invoker;
pub use registry::{Injectable, InjectableRegistry, SERIALIZER, VALIDATOR};
pub use resolved::ResolvedArguments;
pub use scope::{CallContext, InvocationScope};
pub use stages::{InjectResolver, ParameterResolver, StaticResolver, ValidationResolver};
