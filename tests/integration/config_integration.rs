//! Integration tests for Configuration System

use orgtrack::config::ConfigLoader;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_workspace_config_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[polling]
interval_ms = 500
timeout_secs = 120

[render]
format = "table"
color = false
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.polling.interval_ms, 500);
    assert_eq!(config.polling.timeout_secs, 120);
    assert_eq!(config.polling.domain_retry_secs, 240);
    assert_eq!(config.render.format, "table");
    assert!(!config.render.color);
}

#[test]
fn test_environment_file_layers_over_base() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[polling]\ninterval_ms = 500\n").unwrap();
    fs::write(
        config_dir.join("development.toml"),
        "[polling]\ninterval_ms = 250\n",
    )
    .unwrap();

    if std::env::var("ORGTRACK_ENV").is_ok() {
        return;
    }
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.polling.interval_ms, 250);
}

#[test]
fn test_load_from_file_validates() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("orgtrack.toml");
    fs::write(&config_file, "[render]\nformat = \"yaml\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("yaml"), "got: {}", err);
}

#[test]
fn test_load_from_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&temp_dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_logging_section_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("orgtrack.toml");
    fs::write(
        &config_file,
        r#"
[logging]
level = "debug"
format = "json"
output = "stdout"

[logging.modules]
orgtrack = "trace"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(
        config.logging.modules.get("orgtrack").map(String::as_str),
        Some("trace")
    );
}
