//! Global subscriber installation.
//!
//! Kept in its own test binary: the subscriber is process-wide.

use fastpoint_telemetry::{init_logging, LogConfig, TelemetryError};

#[test]
fn test_second_init_fails() {
    let config = LogConfig {
        level: "warn".to_string(),
        ..LogConfig::default()
    };
    init_logging(&config).expect("first init installs the subscriber");

    let err = init_logging(&LogConfig::development()).unwrap_err();
    assert!(matches!(err, TelemetryError::LoggingInit(_)));

    // Filters are checked before installation.
    let bad = LogConfig {
        level: "fastpoint=loud".to_string(),
        ..LogConfig::default()
    };
    assert!(matches!(init_logging(&bad), Err(TelemetryError::InvalidFilter { .. })));
}
