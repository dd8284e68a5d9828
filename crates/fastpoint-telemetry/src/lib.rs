//! Logging setup for Fastpoint.
//!
//! Every Fastpoint crate emits `tracing` events; this crate installs a
//! `tracing-subscriber` registry with an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! and a JSON or pretty formatting layer.
//!
//! ```rust,no_run
//! use fastpoint_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production()).expect("logging");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
