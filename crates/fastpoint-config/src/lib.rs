//! Typed configuration for Fastpoint.
//!
//! This crate provides a strongly-typed configuration with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`FastpointConfig`] has three sections:
//!
//! - [`RouterConfig`] - Namespace and version of the root router
//! - [`ValidationConfig`] - How request parameters are coerced
//! - [`LoggingConfig`] - Log level and format
//!
//! # Example
//!
//! ```no_run
//! use fastpoint_config::ConfigLoader;
//!
//! # fn main() -> Result<(), fastpoint_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("fastpoint.toml")?
//!     .with_env_prefix("FASTPOINT")
//!     .load()?;
//!
//! println!("Routes live under /{}/{}", config.router.namespace, config.router.version);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! namespace = "my-api"
//! version = "v1"
//! override_routes = false
//!
//! [validation]
//! strict = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`, e.g. `FASTPOINT__ROUTER__VERSION=v2`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{FastpointConfig, FastpointConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, RouterConfig, ValidationConfig};
