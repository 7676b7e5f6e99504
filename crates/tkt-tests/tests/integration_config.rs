// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Loading real files in every supported format, placeholder resolution
//! and environment overrides. Environment lookups go through closures so
//! nothing here mutates the process environment.

use std::collections::HashMap;
use std::io::Write;

use tempfile::NamedTempFile;
use tkt_config::loader::{apply_overrides, resolve_env_placeholders};
use tkt_config::{ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel, TktConfig};

use tkt_tests::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

fn loader() -> ConfigLoader {
    ConfigLoader::new().with_env_vars(false)
}

fn write_config(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn validation_field(err: ConfigError) -> String {
    match err {
        ConfigError::Validation { field, .. } => field,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// =============================================================================
// File Loading
// =============================================================================

#[test]
fn test_load_full_yaml_file() {
    init_test_logging();
    let file = write_config(FULL_YAML, "yaml");
    let config = loader().load(file.path()).unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.cors_origins, vec!["https://tickets.example.com"]);
    assert!(!config.server.conceal_forbidden_tickets);
    assert_eq!(config.server.request_timeout_secs, 10);

    assert_eq!(config.auth.issuer, "tickets.example.com");
    assert_eq!(config.auth.access_token_ttl_secs, 600);
    assert_eq!(config.auth.refresh_token_ttl_secs, 7200);
    assert_eq!(config.auth.algorithm, "HS512");

    assert_eq!(config.cookie.name, "tkt-refresh");
    assert_eq!(config.cookie.path, "/api");

    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);

    assert_eq!(config.seed.users.len(), 1);
    assert_eq!(config.seed.users[0].role, "admin");
}

#[test]
fn test_load_minimal_toml_uses_defaults() {
    let file = write_config(MINIMAL_TOML, "toml");
    let config = loader().load(file.path()).unwrap();
    let defaults = TktConfig::default();

    assert_eq!(config.auth.jwt_secret.expose(), "toml-fixture-secret-that-is-long-enough");
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.server.base_path, "/api/v1");
    assert_eq!(config.auth.access_token_ttl_secs, 900);
    assert_eq!(config.auth.refresh_token_ttl_secs, 86400);
    assert_eq!(config.cookie.name, "tapp-refresh_token");
    assert!(config.server.conceal_forbidden_tickets);
    assert!(config.seed.users.is_empty());
}

#[test]
fn test_load_json_file_with_seed() {
    let file = write_config(SEEDED_JSON, "json");
    let config = loader().load(file.path()).unwrap();

    assert_eq!(config.seed.users.len(), 1);
    assert_eq!(config.seed.users[0].email, "agent@example.com");
    assert_eq!(config.seed.users[0].role, "agent");
}

#[test]
fn test_load_rejects_unknown_extension_and_missing_file() {
    let file = write_config(MINIMAL_TOML, "ini");
    let err = loader().load(file.path()).unwrap_err();
    assert_eq!(err.error_type(), "unsupported_format");

    let err = loader().load("/definitely/not/here/tkt.yaml").unwrap_err();
    assert!(err.is_io_error());
}

#[test]
fn test_load_parse_error_names_the_file() {
    let file = write_config("server: [unterminated", "yaml");
    let err = loader().load(file.path()).unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_load_rejects_unknown_keys() {
    let content = format!("{MINIMAL_TOML}\n[server]\nprot = 8080\n");
    let file = write_config(&content, "toml");
    assert!(loader().load(file.path()).is_err());
}

#[test]
fn test_defaults_without_secret_are_invalid() {
    let err = loader().load_defaults().unwrap_err();
    assert_eq!(validation_field(err), "auth.jwt_secret");
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_failures() {
    let cases = [
        ("[auth]\njwt_secret = \"\"\n", "auth.jwt_secret"),
        (
            "[auth]\njwt_secret = \"s\"\naccess_token_ttl_secs = 900\nrefresh_token_ttl_secs = 600\n",
            "auth.refresh_token_ttl_secs",
        ),
        ("[auth]\njwt_secret = \"s\"\nalgorithm = \"RS256\"\n", "auth.algorithm"),
        ("[auth]\njwt_secret = \"s\"\n[server]\nport = 0\n", "server.port"),
        ("[auth]\njwt_secret = \"s\"\n[cookie]\nname = \"bad name\"\n", "cookie.name"),
        ("[auth]\njwt_secret = \"s\"\n[cookie]\npath = \"api\"\n", "cookie.path"),
        (
            "[auth]\njwt_secret = \"s\"\n[[seed.users]]\nemail = \"x@example.com\"\npassword = \"pw\"\nrole = \"owner\"\n",
            "seed.users[0].role",
        ),
    ];

    for (content, field) in cases {
        let err = loader()
            .load_from_str(content, ConfigFormat::Toml)
            .unwrap_err();
        assert_eq!(validation_field(err), field, "config:\n{content}");
    }
}

#[test]
fn test_algorithm_is_case_insensitive() {
    let config = loader()
        .load_from_str("[auth]\njwt_secret = \"s\"\nalgorithm = \"hs384\"\n", ConfigFormat::Toml)
        .unwrap();
    assert_eq!(config.auth.algorithm, "hs384");
}

#[test]
fn test_secret_is_redacted_in_debug_output() {
    let config = loader().load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("toml-fixture-secret"));
}

// =============================================================================
// Environment
// =============================================================================

#[test]
fn test_placeholders_in_full_yaml() {
    let vars = env(&[("TKT_TEST_ADMIN_PASSWORD", "from-env")]);
    let resolved = resolve_env_placeholders(FULL_YAML, |name| vars.get(name).cloned());
    let config = loader().load_from_str(&resolved, ConfigFormat::Yaml).unwrap();
    assert_eq!(config.seed.users[0].password.expose(), "from-env");

    let fallback = resolve_env_placeholders(FULL_YAML, |_| None);
    let config = loader().load_from_str(&fallback, ConfigFormat::Yaml).unwrap();
    assert_eq!(config.seed.users[0].password.expose(), "fallback-password");
}

#[test]
fn test_overrides_beat_file_values() {
    let mut config = loader().load_from_str(FULL_YAML, ConfigFormat::Yaml).unwrap();
    let vars = env(&[
        ("TKT_JWT_SECRET", "override-secret"),
        ("TKT_PORT", "7070"),
        ("TKT_ACCESS_TOKEN_TTL_SECS", "300"),
        ("TKT_COOKIE_NAME", "refresh"),
        ("TKT_LOG_LEVEL", "warning"),
    ]);

    apply_overrides(&mut config, "TKT", |name| vars.get(name).cloned()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.auth.jwt_secret.expose(), "override-secret");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.auth.access_token_ttl_secs, 300);
    assert_eq!(config.auth.refresh_token_ttl_secs, 7200);
    assert_eq!(config.cookie.name, "refresh");
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_overrides_reject_bad_values() {
    let mut config = TktConfig::default();
    let vars = env(&[("APP_PORT", "eighty")]);

    let err = apply_overrides(&mut config, "APP", |name| vars.get(name).cloned()).unwrap_err();
    match err {
        ConfigError::InvalidEnvVar { name, .. } => assert_eq!(name, "APP_PORT"),
        other => panic!("expected invalid env var, got {other:?}"),
    }
}

#[test]
fn test_override_can_break_ttl_ordering() {
    let mut config = loader().load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
    let vars = env(&[("TKT_REFRESH_TOKEN_TTL_SECS", "60")]);

    apply_overrides(&mut config, "TKT", |name| vars.get(name).cloned()).unwrap();
    assert_eq!(
        validation_field(config.validate().unwrap_err()),
        "auth.refresh_token_ttl_secs"
    );
}
