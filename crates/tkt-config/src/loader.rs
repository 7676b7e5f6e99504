// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for tkt.
//!
//! # Loading Pipeline
//!
//! 1. Read the file (YAML, TOML or JSON, chosen by extension)
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse into [`TktConfig`]
//! 4. Apply `TKT_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! TKT_JWT_SECRET=...
//! TKT_ACCESS_TOKEN_TTL_SECS=600
//! TKT_COOKIE_DOMAIN=tickets.example.com
//! TKT_PORT=9090
//! TKT_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogLevel, SecretValue, TktConfig};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for tkt.
///
/// # Examples
///
/// ```no_run
/// use tkt_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("tkt.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: "TKT".to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<TktConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let content = read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let content = self.resolve_placeholders(&content);
        let mut config: TktConfig = parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;

        debug!(
            port = config.server.port,
            seed_users = config.seed.users.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<TktConfig> {
        let content = self.resolve_placeholders(content);
        let mut config: TktConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from defaults plus environment overrides.
    ///
    /// Used when no configuration file is given.
    pub fn load_defaults(&self) -> ConfigResult<TktConfig> {
        let mut config = TktConfig::default();
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_placeholders(&self, content: &str) -> String {
        if self.resolve_env_vars {
            resolve_env_placeholders(content, |name| env::var(name).ok())
        } else {
            content.to_string()
        }
    }

    /// Applies `<PREFIX>_*` environment overrides.
    fn apply_env_overrides(&self, config: &mut TktConfig) -> ConfigResult<()> {
        apply_overrides(config, &self.env_prefix, |name| env::var(name).ok())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn read_file(path: &Path) -> ConfigResult<String> {
    if !path.exists() {
        return Err(ConfigError::file_not_found(path));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
}

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
///
/// Unknown variables without a default are left in place. An unclosed
/// `${` is copied through unchanged.
pub fn resolve_env_placeholders(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }
        chars.next(); // consume '{'

        let mut var_content = String::new();
        let mut found_close = false;
        for c in chars.by_ref() {
            if c == '}' {
                found_close = true;
                break;
            }
            var_content.push(c);
        }

        if !found_close {
            result.push_str("${");
            result.push_str(&var_content);
            continue;
        }

        let (var_name, default_value) = match var_content.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_content.as_str(), None),
        };

        match (lookup(var_name), default_value) {
            (Some(value), _) => result.push_str(&value),
            (None, Some(default)) => result.push_str(default),
            (None, None) => {
                warn!(variable = var_name, "Environment variable not found");
                result.push_str(&format!("${{{}}}", var_name));
            }
        }
    }

    result
}

/// Applies `<prefix>_*` overrides read through `lookup`.
pub fn apply_overrides(
    config: &mut TktConfig,
    prefix: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    let var = |suffix: &str| {
        let name = format!("{prefix}_{suffix}");
        lookup(&name).map(|value| (name, value))
    };

    if let Some((_, value)) = var("JWT_SECRET") {
        config.auth.jwt_secret = SecretValue::new(value);
    }
    if let Some((_, value)) = var("JWT_ISSUER") {
        config.auth.issuer = value;
    }
    if let Some((_, value)) = var("JWT_AUDIENCE") {
        config.auth.audience = value;
    }
    if let Some((name, value)) = var("ACCESS_TOKEN_TTL_SECS") {
        config.auth.access_token_ttl_secs = parse_number(&name, &value)?;
    }
    if let Some((name, value)) = var("REFRESH_TOKEN_TTL_SECS") {
        config.auth.refresh_token_ttl_secs = parse_number(&name, &value)?;
    }
    if let Some((_, value)) = var("COOKIE_NAME") {
        config.cookie.name = value;
    }
    if let Some((_, value)) = var("COOKIE_PATH") {
        config.cookie.path = value;
    }
    if let Some((_, value)) = var("COOKIE_DOMAIN") {
        config.cookie.domain = value;
    }
    if let Some((name, value)) = var("PORT") {
        config.server.port = parse_number(&name, &value)?;
    }
    if let Some((name, value)) = var("LOG_LEVEL") {
        config.logging.level = LogLevel::parse(&value)
            .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a log level"))?;
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_env_var(name, format!("expected a number, got '{value}'")))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<TktConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with default settings.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<TktConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const YAML: &str = r#"
server:
  port: 9000
auth:
  jwt_secret: "yaml-secret-that-is-long-enough-000000"
  access_token_ttl_secs: 600
cookie:
  domain: tickets.example.com
seed:
  users:
    - email: admin@example.com
      password: changeme
      role: admin
"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn no_env() -> ConfigLoader {
        ConfigLoader::new().with_env_vars(false)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_load_yaml() {
        let config = no_env().load_from_str(YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.base_path, "/api/v1");
        assert_eq!(config.auth.access_token_ttl_secs, 600);
        assert_eq!(config.cookie.domain, "tickets.example.com");
        assert_eq!(config.cookie.name, "tapp-refresh_token");
        assert_eq!(config.seed.users.len(), 1);
        assert_eq!(config.seed.users[0].role, "admin");
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[server]
port = 8500

[auth]
jwt_secret = "toml-secret-that-is-long-enough-0000000"
"#;
        let config = no_env().load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.server.port, 8500);
        assert_eq!(config.auth.refresh_token_ttl_secs, 86_400);
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"auth": {"jwt_secret": "json-secret-that-is-long-enough-00000"}}"#;
        let config = no_env().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"auth": {"jwt_secret": "x", "jwt_secrte": "typo"}}"#;
        assert!(no_env().load_from_str(json, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let json = r#"{"auth": {"jwt_secret": ""}}"#;
        let err = no_env().load_from_str(json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_resolve_placeholders() {
        let env = lookup(&[("SECRET", "from-env")]);
        assert_eq!(resolve_env_placeholders("a: ${SECRET}", &env), "a: from-env");
        assert_eq!(resolve_env_placeholders("a: ${MISSING:fallback}", &env), "a: fallback");
        assert_eq!(resolve_env_placeholders("a: ${MISSING}", &env), "a: ${MISSING}");
        assert_eq!(resolve_env_placeholders("a: ${OPEN", &env), "a: ${OPEN");
        assert_eq!(resolve_env_placeholders("cost: $5", &env), "cost: $5");
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = TktConfig::default();
        let env = lookup(&[
            ("TKT_JWT_SECRET", "override-secret"),
            ("TKT_JWT_ISSUER", "tickets.example.com"),
            ("TKT_ACCESS_TOKEN_TTL_SECS", "300"),
            ("TKT_REFRESH_TOKEN_TTL_SECS", "3600"),
            ("TKT_COOKIE_NAME", "rt"),
            ("TKT_PORT", "9100"),
            ("TKT_LOG_LEVEL", "debug"),
        ]);
        apply_overrides(&mut config, "TKT", env).unwrap();

        assert_eq!(config.auth.jwt_secret.expose(), "override-secret");
        assert_eq!(config.auth.issuer, "tickets.example.com");
        assert_eq!(config.auth.access_token_ttl_secs, 300);
        assert_eq!(config.auth.refresh_token_ttl_secs, 3600);
        assert_eq!(config.cookie.name, "rt");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = TktConfig::default();
        let err = apply_overrides(&mut config, "TKT", lookup(&[("TKT_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "TKT_PORT"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = no_env().load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = no_env().load("/nonexistent/tkt.yaml").unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = no_env().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
