//! Configuration loading tests
//!
//! Tests that touch process environment are serialized.

use serial_test::serial;
use std::io::Write;
use tsuzuri_common::config::{TomlConfig, CONFIG_PATH_ENV};
use tsuzuri_common::Error;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
        port = 9000

        [generative]
        model = "gpt-4.1-mini"

        [practice]
        history_limit = 5
        "#,
    );

    let config = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.generative.model, "gpt-4.1-mini");
    assert_eq!(config.generative.timeout_secs, 30);
    assert_eq!(config.practice.history_limit, 5);
    assert_eq!(config.practice.default_category, "general");
}

#[test]
fn test_full_file() {
    let file = write_config(
        r#"
        database_path = "/tmp/tsuzuri-test.db"
        host = "0.0.0.0"
        port = 8080

        [logging]
        level = "debug"

        [generative]
        base_url = "http://localhost:11434/v1"
        api_key = "sk-local"
        max_output_tokens = 500
        timeout_secs = 5

        [http]
        cors_allowed_origins = ["http://localhost:3000"]
        secure_cookies = true
        session_max_age_secs = 3600
        "#,
    );

    let config = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(
        config.resolved_database_path(),
        std::path::PathBuf::from("/tmp/tsuzuri-test.db")
    );
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.generative.api_key.as_deref(), Some("sk-local"));
    assert_eq!(config.generative.max_output_tokens, 500);
    assert_eq!(config.http.cors_allowed_origins, vec!["http://localhost:3000"]);
    assert!(config.http.secure_cookies);
    assert_eq!(config.http.session_max_age_secs, 3600);
    assert_eq!(config.source.as_deref(), Some(file.path()));
}

#[test]
fn test_non_positive_session_age_is_config_error() {
    let file = write_config("[http]\nsession_max_age_secs = 0");
    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("port = \"not a number\"");
    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = TomlConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_default_location_from_env() {
    let file = write_config("port = 7001");
    std::env::set_var(CONFIG_PATH_ENV, file.path());

    let config = TomlConfig::load(None).unwrap();
    std::env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(config.port, 7001);
}

#[test]
#[serial]
fn test_missing_default_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("none.toml"));

    let config = TomlConfig::load(None).unwrap();
    std::env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(config.port, 8000);
    assert!(config.source.is_none());
}

#[test]
#[serial]
fn test_process_env_overrides_file() {
    let file = write_config("port = 9000\n[generative]\nmodel = \"from-file\"");
    std::env::set_var("TSUZURI_MODEL", "from-env");

    let mut config = TomlConfig::load(Some(file.path())).unwrap();
    let result = config.apply_env();
    std::env::remove_var("TSUZURI_MODEL");

    result.unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.generative.model, "from-env");
}
