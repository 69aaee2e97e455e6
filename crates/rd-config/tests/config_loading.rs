//! Integration tests for config file loading and layering.

use std::fs;

use rd_config::{
    load_config_with_env, ConfigOptions, ConfigSource, DumperConfig, TimestampZone,
};
use rd_redact::FieldClass;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "reqdump.toml",
        r#"
        cookie_filter = "JSESSIONID"
        request_header_filter = "Authorization|Cookie"
        extended_response = true
        "#,
    );

    let config = DumperConfig::load(&path).unwrap();
    assert_eq!(config.cookie_filter.as_deref(), Some("JSESSIONID"));
    assert_eq!(
        config.request_header_filter.as_deref(),
        Some("Authorization|Cookie")
    );
    assert!(config.extended());
}

#[test]
fn test_load_json_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "reqdump.json",
        r#"{"param_filter": "", "timestamp_zone": "utc"}"#,
    );

    let config = DumperConfig::load(&path).unwrap();
    assert_eq!(config.param_filter.as_deref(), Some(""));
    assert_eq!(config.zone(), TimestampZone::Utc);
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.toml", "param_filter = ");

    let err = DumperConfig::load(&path).unwrap_err();
    assert_eq!(err.code(), 61);
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_layering_file_env_cli() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "reqdump.toml",
        r#"
        param_filter = "pin"
        cookie_filter = "JSESSIONID"
        response_header_filter = "Set-Cookie"
        "#,
    );

    let options = ConfigOptions {
        config_path: Some(path.clone()),
        overrides: DumperConfig::new().with_filter(FieldClass::ResponseHeader, ""),
        no_discovery: true,
    };
    let loaded = load_config_with_env(&options, |key| match key {
        "REQDUMP_COOKIE_FILTER" => Some("SESSION".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(loaded.source, ConfigSource::CliArgument);
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    // file
    assert_eq!(loaded.config.param_filter.as_deref(), Some("pin"));
    // env beats file
    assert_eq!(loaded.config.cookie_filter.as_deref(), Some("SESSION"));
    // CLI beats file
    assert_eq!(loaded.config.response_header_filter.as_deref(), Some(""));

    let policy = loaded.config.build_policy().unwrap();
    assert_eq!(policy.apply(FieldClass::Parameter, "pin", "1234"), "XXXXXX");
    assert_eq!(policy.apply(FieldClass::Parameter, "password", "pw"), "pw");
    assert_eq!(
        policy.apply(FieldClass::ResponseHeader, "Set-Cookie", "a=b"),
        "a=b"
    );
}

#[test]
fn test_config_file_from_env_var() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "env.toml", "param_filter = \"token\"\n");
    let path_str = path.to_string_lossy().to_string();

    let options = ConfigOptions::default();
    let loaded = load_config_with_env(&options, |key| match key {
        "REQDUMP_CONFIG" => Some(path_str.clone()),
        _ => None,
    })
    .unwrap();

    assert_eq!(loaded.source, ConfigSource::Environment);
    assert_eq!(loaded.config.param_filter.as_deref(), Some("token"));
}

#[test]
fn test_invalid_pattern_fails_before_use() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.toml", "request_header_filter = \"(Auth\"\n");

    let options = ConfigOptions {
        config_path: Some(path),
        ..Default::default()
    };
    let err = load_config_with_env(&options, |_| None).unwrap_err();
    assert_eq!(err.code(), 66);
    assert_eq!(err.key(), Some("requestHeaderFilter"));
}
