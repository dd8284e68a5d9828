//! Hooks that let applications adjust registration and responses.
//!
//! Every method has a pass-through default, so implementors override only
//! what they need. An [`Extensions`] value is attached to a router with
//! [`Router::with_extensions`](crate::Router::with_extensions) and shared by
//! the whole router tree.

use std::sync::Arc;

use serde_json::Value;

use fastpoint_core::{ErrorResponse, Exception, FieldError, Request, ResolutionError, Response, RouteInfo};
use fastpoint_extract::{SerializeError, Serializer, Validator};

use crate::endpoint::Endpoint;
use crate::registrar::RouteArgs;
use crate::router::Router;

/// What produced an error passed to [`Extensions::request_error`] or
/// [`Extensions::response_error`].
#[derive(Debug, Clone, Copy)]
pub enum ErrorCause<'a> {
    /// Handler arguments could not be resolved.
    Resolution(&'a ResolutionError),
    /// A handler threw.
    Exception(&'a Exception),
    /// Response data did not match the declared schema.
    InvalidResponse(&'a [FieldError]),
    /// Response data could not be serialized.
    Serialize(&'a SerializeError),
    /// Response data was not an array or object.
    UnexpectedData(&'a Value),
}

/// Application hooks.
#[allow(unused_variables)]
pub trait Extensions: Send + Sync {
    /// Adjusts the arguments of a route about to be registered. `None` skips it.
    fn endpoint_args(&self, args: RouteArgs, namespace: &str, rest_base: &str, endpoint: &Endpoint) -> Option<RouteArgs> {
        Some(args)
    }

    /// Adjusts an endpoint route, relative to the namespace.
    fn endpoint_route(&self, route: String, endpoint: &Endpoint) -> String {
        route
    }

    /// Decides whether a router (and its sub-routers) get registered.
    fn is_to_register(&self, router: &Router) -> bool {
        true
    }

    /// Adjusts the namespace of the root router.
    fn router_namespace(&self, namespace: String, router: &Router) -> String {
        namespace
    }

    /// Adjusts the rest base of a sub-router.
    fn router_rest_base(&self, rest_base: String, router: &Router) -> String {
        rest_base
    }

    /// Runs before the root router registers anything.
    fn before_register(&self, router: &Router) {}

    /// Runs after the root router and every sub-router are registered.
    fn after_register(&self, router: &Router) {}

    /// Replaces the validator used to resolve handler arguments.
    fn validator(&self, validator: Arc<dyn Validator>) -> Arc<dyn Validator> {
        validator
    }

    /// Replaces the serializer injectable.
    fn serializer(&self, serializer: Arc<dyn Serializer>) -> Arc<dyn Serializer> {
        serializer
    }

    /// Adjusts response data before it is checked against a response schema.
    fn response_data(&self, data: Value, response: &Response, request: &Request) -> Value {
        data
    }

    /// Replaces the validator used for response schemas.
    fn response_validator(&self, validator: Arc<dyn Validator>, request: &Request, response: &Response) -> Arc<dyn Validator> {
        validator
    }

    /// Replaces the serializer used for response schemas.
    fn response_serializer(
        &self,
        serializer: Arc<dyn Serializer>,
        request: &Request,
        response: &Response,
    ) -> Arc<dyn Serializer> {
        serializer
    }

    /// Adjusts an error produced by a response schema.
    fn response_error(&self, error: ErrorResponse, cause: ErrorCause<'_>, response: &Response, request: &Request) -> ErrorResponse {
        error
    }

    /// Adjusts an error produced while running a handler.
    fn request_error(&self, error: ErrorResponse, cause: ErrorCause<'_>, endpoint: &RouteInfo) -> ErrorResponse {
        error
    }
}

/// Extensions that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensions;

impl Extensions for NoExtensions {}
