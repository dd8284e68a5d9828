//! Main configuration types.
//!
//! This module provides the top-level [`FastpointConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, RouterConfig, ValidationConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete Fastpoint configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use fastpoint_config::FastpointConfig;
///
/// let config = FastpointConfig::default();
/// assert_eq!(config.router.namespace, "api");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct FastpointConfig {
    /// Root router configuration.
    #[serde(default)]
    pub router: RouterConfig,

    /// Parameter validation configuration.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FastpointConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use fastpoint_config::{FastpointConfig, RouterConfig};
    ///
    /// let config = FastpointConfig::builder()
    ///     .router(RouterConfig {
    ///         namespace: "my-api".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.router.namespace, "my-api");
    /// ```
    #[must_use]
    pub fn builder() -> FastpointConfigBuilder {
        FastpointConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The router namespace or version is empty (slashes aside)
    /// - The log level is not one of trace, debug, info, warn, error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.namespace.trim_matches('/').is_empty() {
            return Err(ConfigError::invalid_value("router.namespace", "must not be empty"));
        }
        if self.router.version.trim_matches('/').is_empty() {
            return Err(ConfigError::invalid_value("router.version", "must not be empty"));
        }
        if self.router.namespace.contains(char::is_whitespace) {
            return Err(ConfigError::invalid_value(
                "router.namespace",
                format!("must not contain whitespace: {:?}", self.router.namespace),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}, got {}", LOG_LEVELS.join(", "), self.logging.level),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, colored debug logs with source locations and lenient
    /// parameter coercion.
    ///
    /// # Example
    ///
    /// ```
    /// use fastpoint_config::FastpointConfig;
    ///
    /// let config = FastpointConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.validation.strict = false;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level and strict parameter validation.
    ///
    /// # Example
    ///
    /// ```
    /// use fastpoint_config::FastpointConfig;
    ///
    /// let config = FastpointConfig::production();
    /// assert_eq!(config.logging.format, fastpoint_config::LogFormat::Json);
    /// assert!(config.validation.strict);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.validation.strict = true;

        config
    }
}

/// Builder for [`FastpointConfig`].
#[derive(Debug, Default)]
pub struct FastpointConfigBuilder {
    router: Option<RouterConfig>,
    validation: Option<ValidationConfig>,
    logging: Option<LoggingConfig>,
}

impl FastpointConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the router configuration.
    #[must_use]
    pub fn router(mut self, router: RouterConfig) -> Self {
        self.router = Some(router);
        self
    }

    /// Set the validation configuration.
    #[must_use]
    pub fn validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> FastpointConfig {
        FastpointConfig {
            router: self.router.unwrap_or_default(),
            validation: self.validation.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_preset() {
        let config = FastpointConfig::development();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.ansi_enabled);
        assert!(!config.validation.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_preset() {
        let config = FastpointConfig::production();
        assert_eq!(config.logging.level, "info");
        assert!(config.validation.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_version_rejected() {
        let mut config = FastpointConfig::default();
        config.router.version = "/".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "router.version"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let mut config = FastpointConfig::default();
        config.router.namespace = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "router.namespace"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = FastpointConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_unset_sections() {
        let config = FastpointConfig::builder()
            .validation(ValidationConfig { strict: true })
            .build();
        assert!(config.validation.strict);
        assert_eq!(config.router, RouterConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
