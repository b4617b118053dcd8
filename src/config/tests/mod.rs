//! Unit tests for config module
//!
//! Tests configuration defaults, TOML parsing and file loading.

#![allow(clippy::panic)]

use std::fs;

use crate::{
    AppletError,
    config::{AgentConfig, Config, LogLevel},
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.agent.identifier, "org.freedesktop.nm-applet");
    assert!(config.agent.save_prompted_secrets);
    assert_eq!(config.agent.keyring_collection, "default");
}

#[test]
fn config_serialize_toml() {
    let toml_str = Config::default().to_toml().unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[agent]"));
    assert!(toml_str.contains("save_prompted_secrets = true"));
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config {
        agent: AgentConfig {
            save_prompted_secrets: false,
            ..AgentConfig::default()
        },
        ..Config::default()
    };

    let parsed: Config = toml::from_str(&original.to_toml().unwrap()).unwrap();

    assert_eq!(parsed, original);
}

#[test]
fn config_empty_toml() {
    let config: Config = toml::from_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_agent_section() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [agent]
        keyring_collection = "login"
    "#;

    let config: Config = toml::from_str(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.agent.keyring_collection, "login");
    assert_eq!(config.agent.identifier, "org.freedesktop.nm-applet");
    assert!(config.agent.save_prompted_secrets);
}

#[test]
fn config_invalid_toml() {
    let invalid_toml = r#"
        [general
        invalid syntax here
    "#;

    let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);

    assert!(result.is_err());
}

#[test]
fn config_unknown_fields() {
    let toml_with_unknown = r#"
        [general]
        log_level = "warn"
        unknown_field = "should be ignored"

        [unknown_section]
        some_field = "ignored"
    "#;

    let config: Config = toml::from_str(toml_with_unknown).unwrap();
    assert_eq!(config.general.log_level, LogLevel::Warn);
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn load_from_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[agent]\nsave_prompted_secrets = false\n").unwrap();

    let config = Config::load_from(&path).unwrap();

    assert!(!config.agent.save_prompted_secrets);
}

#[test]
fn load_from_reports_parse_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[agent\n").unwrap();

    let Err(AppletError::TomlParseError { location, .. }) = Config::load_from(&path) else {
        panic!("expected a parse error");
    };

    assert!(location.ends_with("config.toml"));
}

#[test]
fn schema_describes_agent_section() {
    let schema = Config::schema().unwrap();

    assert!(schema.contains("save_prompted_secrets"));
    assert!(schema.contains("keyring_collection"));
}

#[test]
fn log_level_filter_directive() {
    assert_eq!(LogLevel::Trace.as_filter(), "trace");
    assert_eq!(LogLevel::default().to_string(), "info");
}
