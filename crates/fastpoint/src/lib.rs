//! # Fastpoint
//!
//! **REST endpoints with dependency injection and request validation**
//!
//! Fastpoint turns plain handler functions into REST endpoints. Each handler
//! declares its parameters; on every request they are resolved from the
//! lifecycle objects, from named injectables and from validated request data.
//!
//! - Static parameters: the request, the response, the endpoint and the
//!   exception being handled
//! - Injectables: values or handlers registered by name, resolved once per request
//! - Request data: URL, query, body, JSON, file, header and cookie parameters,
//!   coerced to the declared types
//!
//! ## Quick Start
//!
//! ```rust
//! use fastpoint::prelude::*;
//!
//! let mut router = Router::new("my-api", "v1");
//! router.inject("greeting", Injectable::value("Hello"), false);
//! router.get(
//!     "hello/(?P<name>\\w+)",
//!     Handler::new(
//!         HandlerDescriptor::new("hello")
//!             .param(ParamSpec::new("greeting").string().inject())
//!             .param(ParamSpec::new("name").string()),
//!         |args| {
//!             let greeting: String = args.get(0)?;
//!             let name: String = args.get(1)?;
//!             Ok(PhaseResult::json(format!("{greeting} {name}!")))
//!         },
//!     ),
//! );
//! # let _ = router;
//! ```
//!
//! ## Request lifecycle
//!
//! ```text
//! permission handlers → middleware (request) → handler → middleware (response)
//!          └──────────── exception handlers on any thrown exception ───────┘
//! ```
//!
//! Any phase may stop the request by returning a response or an error.

#![doc(html_root_url = "https://docs.rs/fastpoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap;
mod error;

pub use bootstrap::{bootstrap, log_config, root_router};
pub use error::BootstrapError;

// Re-export core types
pub use fastpoint_core as core;

// Re-export parameter extraction types
pub use fastpoint_extract as extract;

// Re-export dependency resolution types
pub use fastpoint_di as di;

// Re-export endpoint and router types
pub use fastpoint_endpoint as endpoint;

// Re-export configuration types
pub use fastpoint_config as config;

// Re-export logging setup
pub use fastpoint_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use fastpoint::prelude::*;
/// ```
pub mod prelude {
    pub use fastpoint_core::{
        Arg, Arguments, ErrorResponse, Exception, ExceptionClass, PhaseResult, Request, Response,
    };

    // Re-export handler and injectable types
    pub use fastpoint_di::{Handler, Injectable};

    // Re-export parameter declarations
    pub use fastpoint_extract::{AliasGenerator, HandlerDescriptor, ParamSpec, Schema, Source};

    // Re-export endpoint types
    pub use fastpoint_endpoint::{
        CapabilityChecker, Endpoint, Extensions, HandlerMiddleware, RouteRegistrar, Router,
    };

    // Re-export configuration
    pub use fastpoint_config::{ConfigLoader, FastpointConfig};
}
