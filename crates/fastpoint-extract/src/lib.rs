//! # Fastpoint Extract
//!
//! Locating and coercing handler parameters.
//!
//! ## Sources
//!
//! A [`Source`] pulls raw values out of one part of the request:
//!
//! | Source | Origin | Notes |
//! |--------|--------|-------|
//! | [`Source::Url`] | URL captures | |
//! | [`Source::Query`] | Query string | |
//! | [`Source::Json`] | JSON body | Empty unless the body is JSON |
//! | [`Source::Body`] | Form body | |
//! | [`Source::Header`] | Headers | Names lowercased, `-` becomes `_`, repeated headers joined with `,` |
//! | [`Source::Cookie`] | `Cookie` headers | |
//! | [`Source::File`] | Uploaded files | Each file is an object |
//! | [`Source::Any`] | Everything, merged | |
//!
//! ## Descriptors
//!
//! A [`HandlerDescriptor`] lists a handler's parameters in order: name, declared
//! type(s), default, nullability, sources, alias and inject marker. It is built
//! once when the handler is declared and never changes.
//!
//! ```rust
//! use fastpoint_extract::{AliasGenerator, HandlerDescriptor, ParamSpec, Source};
//!
//! let descriptor = HandlerDescriptor::new("list_posts")
//!     .alias_generator(AliasGenerator::Snake)
//!     .param(ParamSpec::new("postId").int().from(Source::Query))
//!     .param(ParamSpec::new("allPosts").array().from(Source::Query).default_value(serde_json::json!([])));
//!
//! assert_eq!(descriptor.alias_for(0), "post_id");
//! assert_eq!(descriptor.alias_for(1), "all_posts");
//! ```
//!
//! ## Coercion
//!
//! [`Validator`] turns raw values into the declared types and reports
//! [`FieldError`](fastpoint_core::FieldError)s. [`LazyParameters`] finds the raw
//! value for each parameter on demand.

#![doc(html_root_url = "https://docs.rs/fastpoint-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod case;
mod descriptor;
mod lazy;
pub mod schema;
mod serializer;
mod source;
mod validator;

pub use case::AliasGenerator;
pub use descriptor::{BuiltinType, ContextKind, HandlerDescriptor, InjectSpec, ParamSpec, ParamType};
pub use lazy::LazyParameters;
pub use schema::{Coercion, Schema, SchemaKind};
pub use serializer::{JsonSerializer, SerializeError, Serializer};
pub use source::{ParameterSource, Source};
pub use validator::{DefaultValidator, Validator};
