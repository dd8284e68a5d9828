//! Middleware: handlers that run around the main handler.
//!
//! A middleware contributes an `on_request` handler (run before the main
//! handler) and/or an `on_response` handler (run after it). Both are regular
//! [`Handler`]s, so they take any parameters the main handler could, including
//! the response being built. Returning [`PhaseResult::Respond`] or
//! [`PhaseResult::Fail`] ends the request.
//!
//! ```rust
//! use fastpoint_core::{ErrorResponse, PhaseResult};
//! use fastpoint_di::Handler;
//! use fastpoint_endpoint::HandlerMiddleware;
//! use fastpoint_extract::{HandlerDescriptor, ParamSpec};
//!
//! let middleware = HandlerMiddleware::new("action-guard").on_request(Handler::new(
//!     HandlerDescriptor::new("guard").param(ParamSpec::new("action").string()),
//!     |args| {
//!         let action: String = args.get(0)?;
//!         if action == "error" {
//!             return Ok(PhaseResult::Fail(ErrorResponse::new(469, "Triggered error action before handling request")));
//!         }
//!         Ok(PhaseResult::null())
//!     },
//! ));
//! ```
//!
//! [`PhaseResult::Respond`]: fastpoint_core::PhaseResult::Respond
//! [`PhaseResult::Fail`]: fastpoint_core::PhaseResult::Fail

use fastpoint_di::Handler;

/// Something that hooks into the request and/or response phase.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Handler run before the main handler.
    fn on_request(&self) -> Option<Handler> {
        None
    }

    /// Handler run after the main handler.
    fn on_response(&self) -> Option<Handler> {
        None
    }
}

/// A middleware assembled from plain handlers.
#[derive(Debug, Clone)]
pub struct HandlerMiddleware {
    name: String,
    on_request: Option<Handler>,
    on_response: Option<Handler>,
}

impl HandlerMiddleware {
    /// Creates a middleware with no handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_request: None,
            on_response: None,
        }
    }

    /// Sets the request-phase handler.
    #[must_use]
    pub fn on_request(mut self, handler: Handler) -> Self {
        self.on_request = Some(handler);
        self
    }

    /// Sets the response-phase handler.
    #[must_use]
    pub fn on_response(mut self, handler: Handler) -> Self {
        self.on_response = Some(handler);
        self
    }
}

impl Middleware for HandlerMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_request(&self) -> Option<Handler> {
        self.on_request.clone()
    }

    fn on_response(&self) -> Option<Handler> {
        self.on_response.clone()
    }
}
