//! Root router construction from configuration.

use std::sync::Arc;

use fastpoint_config::{FastpointConfig, LogFormat, LoggingConfig, ValidationConfig};
use fastpoint_endpoint::Router;
use fastpoint_extract::DefaultValidator;
use fastpoint_telemetry::{init_logging, LogConfig};
use tracing::info;

use crate::error::BootstrapError;

/// Validates `config`, installs the logging subscriber and returns the root
/// router it describes.
///
/// Logging is process wide, so this is meant to be called once. Use
/// [`root_router`] to build further routers from the same configuration.
///
/// # Example
///
/// ```no_run
/// use fastpoint::prelude::*;
///
/// let config = FastpointConfig::production();
/// let mut router = fastpoint::bootstrap(&config)?;
/// router.get("status", Handler::from_fn("status", || Ok(PhaseResult::json("ok"))));
/// # Ok::<(), fastpoint::BootstrapError>(())
/// ```
pub fn bootstrap(config: &FastpointConfig) -> Result<Router, BootstrapError> {
    config.validate()?;
    init_logging(&log_config(&config.logging))?;

    let router = root_router(config);
    info!(
        namespace = %router.namespace(),
        strict = config.validation.strict,
        "fastpoint bootstrapped"
    );
    Ok(router)
}

/// Builds the root router described by `config` without touching logging.
pub fn root_router(config: &FastpointConfig) -> Router {
    Router::new(config.router.namespace.as_str(), config.router.version.as_str())
        .with_validator(Arc::new(validator(&config.validation)))
        .with_override_routes(config.router.override_routes)
}

/// Maps the logging section onto the subscriber settings.
pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.to_lowercase(),
        json_format: logging.format == LogFormat::Json,
        ansi: logging.ansi_enabled,
        file_line_info: logging.include_location,
        ..LogConfig::default()
    }
}

fn validator(validation: &ValidationConfig) -> DefaultValidator {
    if validation.strict {
        DefaultValidator::strict()
    } else {
        DefaultValidator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastpoint_extract::Coercion;

    #[test]
    fn test_log_config_from_presets() {
        let production = log_config(&FastpointConfig::production().logging);
        assert!(production.json_format);
        assert!(!production.ansi);
        assert_eq!(production.level, "info");

        let development = log_config(&FastpointConfig::development().logging);
        assert!(!development.json_format);
        assert!(development.ansi);
        assert!(development.file_line_info);
        assert_eq!(development.level, "debug");
    }

    #[test]
    fn test_level_is_lowercased() {
        let logging = LoggingConfig {
            level: "WARN".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(log_config(&logging).level, "warn");
    }

    #[test]
    fn test_validator_follows_strict_flag() {
        assert_eq!(validator(&ValidationConfig { strict: true }).mode(), Coercion::Strict);
        assert_eq!(validator(&ValidationConfig::default()).mode(), Coercion::Lenient);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_logging() {
        let mut config = FastpointConfig::default();
        config.router.namespace = "/".to_string();
        let error = bootstrap(&config).expect_err("empty namespace");
        assert!(matches!(error, BootstrapError::Config(_)));
    }
}
