//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging, e.g. a global subscriber is already set.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The log filter could not be parsed.
    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The rejected filter directive.
        filter: String,
        /// Parser message.
        reason: String,
    },
}
