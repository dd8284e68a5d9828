//! File-based loading tests.

use std::io::Write;

use fastpoint_config::{ConfigError, ConfigLoader, FastpointConfig, LogFormat};
use tempfile::{Builder, NamedTempFile};

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = config_file(
        ".toml",
        r#"
            [router]
            namespace = "wp-fast"
            version = "v2"
            override_routes = true

            [validation]
            strict = true

            [logging]
            level = "debug"
            format = "pretty"
            include_location = true
        "#,
    );

    let loader = ConfigLoader::new().with_file(file.path()).unwrap();
    assert!(loader.file_loaded());
    let config = loader.load().unwrap();

    assert_eq!(config.router.namespace, "wp-fast");
    assert_eq!(config.router.version, "v2");
    assert!(config.router.override_routes);
    assert!(config.validation.strict);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.logging.include_location);
    assert!(config.logging.enabled);
}

#[test]
fn test_json_file_replaces_preset() {
    let file = config_file(".json", r#"{"router": {"namespace": "shop"}}"#);

    let config = ConfigLoader::new()
        .with_production()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.router.namespace, "shop");
    // Sections the file leaves out fall back to defaults, not to the preset.
    assert_eq!(config.validation, FastpointConfig::default().validation);
}

#[test]
fn test_unknown_field_in_file() {
    let file = config_file(".toml", "[router]\nnamespace = \"api\"\nprefix = \"wp-json\"\n");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError(_)));
    assert!(err.to_string().contains("prefix"));
}

#[test]
fn test_unsupported_extension() {
    let file = config_file(".yaml", "router:\n  namespace: api\n");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

#[test]
fn test_optional_file_present() {
    let file = config_file(".toml", "[validation]\nstrict = true\n");
    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();
    assert!(config.validation.strict);
}

#[test]
fn test_missing_dotenv_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new()
        .with_dotenv_file(dir.path().join(".env"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Dotenv(_)));
}
