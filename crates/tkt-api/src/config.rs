// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{CookieConfig, JwtConfig};

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Base path for API endpoints.
    pub base_path: String,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Refresh cookie configuration.
    pub cookie: CookieConfig,
    /// Answer 404 instead of 403 when a ticket exists but is not visible.
    pub conceal_forbidden_tickets: bool,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8081,
            base_path: "/api/v1".to_string(),
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            cookie: CookieConfig::default(),
            conceal_forbidden_tickets: true,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the JWT configuration.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Sets the refresh cookie configuration.
    pub fn with_cookie(mut self, cookie: CookieConfig) -> Self {
        self.cookie = cookie;
        self
    }

    /// Enables or disables hiding forbidden tickets behind 404.
    pub fn with_conceal_forbidden_tickets(mut self, conceal: bool) -> Self {
        self.conceal_forbidden_tickets = conceal;
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin (credentials are then disabled).
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a configuration restricted to `origins`, with credentials.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            max_age: 3600,
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Duration (seconds) serialization
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8081);
        assert_eq!(config.base_path, "/api/v1");
        assert!(config.conceal_forbidden_tickets);
        assert_eq!(config.cookie.name, "tapp-refresh_token");
        assert!(config.cors.is_wildcard());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default().with_port(9000);
        assert_eq!(config.socket_addr().port(), 9000);
    }

    #[test]
    fn test_strict_cors() {
        let cors = CorsConfig::strict(vec!["https://app.example.com".into()]);
        assert!(!cors.is_wildcard());
    }
}
