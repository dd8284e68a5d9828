//! Errors raised while starting an API from configuration.

use fastpoint_config::ConfigError;
use fastpoint_telemetry::TelemetryError;
use thiserror::Error;

/// Failure to bootstrap a root router.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration did not validate.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The logging subscriber could not be installed.
    #[error("Unable to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
}
