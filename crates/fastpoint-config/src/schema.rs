//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Root router section.
///
/// The root router of an API needs both a namespace and a version; together
/// they form the route prefix, e.g. `/my-api/v1`.
///
/// # Example
///
/// ```
/// use fastpoint_config::RouterConfig;
///
/// let config = RouterConfig {
///     namespace: "my-api".to_string(),
///     version: "v1".to_string(),
///     override_routes: false,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// API namespace (the router base), e.g. "my-api".
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// API version, e.g. "v1".
    #[serde(default = "default_version")]
    pub version: String,

    /// Whether endpoints replace routes already registered with the host.
    #[serde(default)]
    pub override_routes: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            version: default_version(),
            override_routes: false,
        }
    }
}

fn default_namespace() -> String {
    "api".to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

/// Request parameter validation section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Reject scalar strings where numbers or booleans are expected instead
    /// of coercing them (`"5"` is not an integer in strict mode).
    #[serde(default)]
    pub strict: bool,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.namespace, "api");
        assert_eq!(config.version, "v1");
        assert!(!config.override_routes);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: RouterConfig = toml::from_str(r#"namespace = "my-api""#).unwrap();
        assert_eq!(config.namespace, "my-api");
        assert_eq!(config.version, "v1");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ValidationConfig, _> = toml::from_str("strictness = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "pretty"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.enabled);
    }
}
