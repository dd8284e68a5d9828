//! # Fastpoint Core
//!
//! Core types shared by every Fastpoint crate.
//!
//! - [`Request`] - Host request with URL, query, JSON, form, header, cookie and file parameters
//! - [`Response`] / [`ResponseHandle`] - Mutable response shared by every phase of a request
//! - [`RouteInfo`] - The endpoint being served (method, route, full route)
//! - [`Arg`] / [`Arguments`] - Resolved handler arguments
//! - [`PhaseResult`] - Continue, early response or error
//! - [`ErrorResponse`] / [`ResolutionError`] - Error-shaped values returned to the host
//! - [`Exception`] / [`ExceptionClass`] - Failures thrown by handler bodies

#![doc(html_root_url = "https://docs.rs/fastpoint-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod exception;
mod outcome;
pub mod request;
mod response;
mod route;
mod value;

pub use error::{ErrorResponse, FieldError, ResolutionError};
pub use exception::{Exception, ExceptionClass, BASE_EXCEPTION};
pub use outcome::PhaseResult;
pub use request::{Params, Request, RequestError, UploadedFile};
pub use response::{Response, ResponseHandle};
pub use route::RouteInfo;
pub use value::{Arg, ArgumentError, Arguments};
