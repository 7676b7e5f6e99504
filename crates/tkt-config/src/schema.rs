// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for tkt.
//!
//! ```yaml
//! server:
//!   port: 8081
//!   base_path: /api/v1
//! auth:
//!   jwt_secret: "${TKT_JWT_SECRET}"
//!   issuer: example.com
//!   access_token_ttl_secs: 900
//!   refresh_token_ttl_secs: 86400
//! cookie:
//!   name: tapp-refresh_token
//!   domain: localhost
//! logging:
//!   level: info
//! seed:
//!   users:
//!     - email: admin@example.com
//!       password: "${TKT_ADMIN_PASSWORD}"
//!       role: admin
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default API port.
pub const DEFAULT_PORT: u16 = 8081;

/// Default API base path.
pub const DEFAULT_BASE_PATH: &str = "/api/v1";

/// Default access token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default refresh token lifetime (24 hours).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

/// Default refresh cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "tapp-refresh_token";

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

const SEED_ROLES: [&str; 3] = ["user", "agent", "admin"];

// =============================================================================
// TktConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TktConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Token settings.
    pub auth: AuthConfig,
    /// Refresh cookie settings.
    pub cookie: CookieConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Accounts created at startup.
    pub seed: SeedConfig,
}

impl TktConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.cookie.validate()?;
        self.seed.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Path prefix for every API route.
    pub base_path: String,
    /// Allowed CORS origins. `*` allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// Answer 404 instead of 403 for tickets the caller may not see.
    pub conceal_forbidden_tickets: bool,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            base_path: DEFAULT_BASE_PATH.to_string(),
            cors_origins: vec!["*".to_string()],
            conceal_forbidden_tickets: true,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            max_body_size: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Validates the server settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::validation(
                "server.host",
                format!("'{}' is not an IP address", self.host),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "must be non-zero"));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::validation(
                "server.base_path",
                "must be empty or start with '/'",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "must be positive",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation("server.max_body_size", "must be positive"));
        }
        Ok(())
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Token signing and lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC signing secret.
    pub jwt_secret: SecretValue,
    /// Issuer written to and required of access tokens.
    pub issuer: String,
    /// Audience written to and required of access tokens.
    pub audience: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,
    /// Signing algorithm (`HS256`, `HS384` or `HS512`).
    pub algorithm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretValue::default(),
            issuer: "example.com".to_string(),
            audience: "example.com".to_string(),
            access_token_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            algorithm: "HS256".to_string(),
        }
    }
}

impl AuthConfig {
    /// Validates the token settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::validation("auth.jwt_secret", "must not be empty"));
        }
        if self.access_token_ttl_secs <= 0 {
            return Err(ConfigError::validation(
                "auth.access_token_ttl_secs",
                "must be positive",
            ));
        }
        if self.refresh_token_ttl_secs <= 0 {
            return Err(ConfigError::validation(
                "auth.refresh_token_ttl_secs",
                "must be positive",
            ));
        }
        for (field, ttl) in [
            ("auth.access_token_ttl_secs", self.access_token_ttl_secs),
            ("auth.refresh_token_ttl_secs", self.refresh_token_ttl_secs),
        ] {
            if ttl > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::validation(
                    field,
                    format!("must not exceed {MAX_TOKEN_TTL_SECS} seconds"),
                ));
            }
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(ConfigError::validation(
                "auth.refresh_token_ttl_secs",
                "must be longer than the access token lifetime",
            ));
        }
        if !SUPPORTED_ALGORITHMS.contains(&self.algorithm.to_uppercase().as_str()) {
            return Err(ConfigError::validation(
                "auth.algorithm",
                format!("unsupported algorithm '{}'", self.algorithm),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Cookie
// =============================================================================

/// Refresh cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute. Omitted when empty.
    pub domain: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            domain: "localhost".to_string(),
        }
    }
}

impl CookieConfig {
    /// Validates the cookie settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("cookie.name", "must not be empty"));
        }
        if self.name.contains([';', '=', ' ', ',']) {
            return Err(ConfigError::validation(
                "cookie.name",
                "must not contain ';', '=', ',' or spaces",
            ));
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::validation("cookie.path", "must start with '/'"));
        }
        Ok(())
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
    /// Include span targets in logs.
    pub with_target: bool,
    /// Include file/line in logs.
    pub with_file: bool,
    /// Include thread IDs in logs.
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
            with_file: false,
            with_thread_ids: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

// =============================================================================
// Seed
// =============================================================================

/// Accounts provisioned at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Accounts to create if missing.
    pub users: Vec<SeedUser>,
}

impl SeedConfig {
    /// Validates every seed account.
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, user) in self.users.iter().enumerate() {
            let field = |name: &str| format!("seed.users[{i}].{name}");
            if !user.email.contains('@') {
                return Err(ConfigError::validation(field("email"), "must be an email address"));
            }
            if user.password.is_empty() {
                return Err(ConfigError::validation(field("password"), "must not be empty"));
            }
            if !SEED_ROLES.contains(&user.role.to_lowercase().as_str()) {
                return Err(ConfigError::validation(
                    field("role"),
                    format!("unknown role '{}'", user.role),
                ));
            }
        }
        Ok(())
    }
}

/// A seed account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed on provisioning.
    pub password: SecretValue,
    /// `user`, `agent` or `admin`.
    #[serde(default = "default_seed_role")]
    pub role: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
}

fn default_seed_role() -> String {
    "user".to_string()
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never appears in `Debug` or `Display` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TktConfig {
        let mut config = TktConfig::default();
        config.auth.jwt_secret = SecretValue::new("a-secret-that-is-at-least-32-bytes!");
        config
    }

    #[test]
    fn test_defaults() {
        let config = TktConfig::default();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.base_path, "/api/v1");
        assert_eq!(config.auth.issuer, "example.com");
        assert_eq!(config.auth.access_token_ttl_secs, 900);
        assert_eq!(config.auth.refresh_token_ttl_secs, 86_400);
        assert_eq!(config.cookie.name, "tapp-refresh_token");
        assert_eq!(config.cookie.path, "/");
        assert_eq!(config.cookie.domain, "localhost");
        assert!(config.seed.users.is_empty());
    }

    #[test]
    fn test_default_requires_secret() {
        let err = TktConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth.jwt_secret"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut config = valid();
        config.auth.refresh_token_ttl_secs = config.auth.access_token_ttl_secs;
        assert!(config.validate().is_err());

        config.auth.access_token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetimes_are_capped() {
        let mut config = valid();
        config.auth.refresh_token_ttl_secs = 10_000_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth.refresh_token_ttl_secs"));

        config.auth.refresh_token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.access_token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth.access_token_ttl_secs"));
    }

    #[test]
    fn test_rejects_non_hmac_algorithm() {
        let mut config = valid();
        config.auth.algorithm = "RS256".into();
        assert!(config.validate().is_err());
        config.auth.algorithm = "hs512".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cookie_validation() {
        let mut config = valid();
        config.cookie.name = " ".into();
        assert!(config.validate().is_err());

        config.cookie.name = "a=b".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_validation() {
        let mut config = valid();
        config.seed.users.push(SeedUser {
            email: "admin@example.com".into(),
            password: SecretValue::new("pw"),
            role: "root".into(),
            first_name: String::new(),
            last_name: String::new(),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("seed.users[0].role"));

        config.seed.users[0].role = "Admin".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(format!("{secret}"), "***");
        assert!(!format!("{secret:?}").contains("hunter2"));
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
