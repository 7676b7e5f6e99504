// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a [`TktConfig`] into a running API server:
//!
//! - Map the config file onto [`ApiConfig`]
//! - Build the server and its in-memory stores
//! - Provision seed accounts
//! - Serve until a shutdown signal, bounded by the shutdown timeout

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use tkt_api::{ApiConfig, ApiServer, ApiServerBuilder, CorsConfig, JwtConfig};
use tkt_config::{ConfigLoader, SeedConfig, TktConfig};
use tkt_core::{Role, UserService};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The runtime that owns the server for the lifetime of the process.
pub struct ServiceRuntime {
    config: Arc<TktConfig>,
    shutdown: ShutdownCoordinator,
    seed: bool,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: TktConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            seed: true,
        }
    }

    /// Enables or disables seed account provisioning.
    pub fn with_seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &TktConfig {
        &self.config
    }

    /// Builds the API server and provisions seed accounts.
    pub async fn prepare(&self) -> BinResult<ApiServer> {
        let api_config = build_api_config(&self.config)?;
        let server = ApiServerBuilder::new()
            .config(api_config)
            .build()
            .map_err(|e| BinError::from(e).with_context("Failed to build API server"))?;

        if self.seed {
            seed_accounts(&server.state().users, &self.config.seed).await?;
        }

        Ok(server)
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(version = tkt_core::VERSION, "Starting tkt");

        let server = self.prepare().await?;
        let shutdown_timeout = server.state().config.shutdown_timeout;

        let signals = self.shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = signals.listen_for_signals().await {
                error!(error = %e, "Signal handling unavailable, shutting down");
                signals.initiate_shutdown();
            }
        });

        let serve = server.run_with_shutdown(self.shutdown.shutdown_signal());
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result?,
            _ = self.shutdown.shutdown_signal() => {
                match tokio::time::timeout(shutdown_timeout, &mut serve).await {
                    Ok(result) => result?,
                    Err(_) => warn!(
                        timeout_secs = shutdown_timeout.as_secs(),
                        "Graceful shutdown timed out, dropping open connections"
                    ),
                }
            }
        }

        info!("tkt shutdown complete");
        Ok(())
    }
}

// =============================================================================
// Config Mapping
// =============================================================================

/// Maps the file configuration onto the API server configuration.
pub fn build_api_config(config: &TktConfig) -> BinResult<ApiConfig> {
    let server = &config.server;
    let auth = &config.auth;

    let host: IpAddr = server
        .host
        .parse()
        .map_err(|_| BinError::config(format!("Invalid server.host '{}'", server.host)))?;

    let cors = if server.cors_origins.iter().any(|o| o == "*") {
        CorsConfig::default()
    } else {
        CorsConfig::strict(server.cors_origins.clone())
    };

    let jwt = JwtConfig::new(auth.jwt_secret.expose())
        .with_issuer(&auth.issuer)
        .with_audience(&auth.audience)
        .with_access_ttl(auth.access_token_ttl_secs)
        .with_refresh_ttl(auth.refresh_token_ttl_secs)
        .with_algorithm_name(&auth.algorithm)
        .map_err(|e| BinError::config(e.to_string()))?;

    let cookie = tkt_api::CookieConfig {
        name: config.cookie.name.clone(),
        path: config.cookie.path.clone(),
        domain: config.cookie.domain.clone(),
    };

    let mut api = ApiConfig::new()
        .with_host(host)
        .with_port(server.port)
        .with_jwt(jwt)
        .with_cookie(cookie)
        .with_conceal_forbidden_tickets(server.conceal_forbidden_tickets);
    api.base_path = server.base_path.trim_end_matches('/').to_string();
    api.cors = cors;
    api.request_timeout = std::time::Duration::from_secs(server.request_timeout_secs);
    api.shutdown_timeout = std::time::Duration::from_secs(server.shutdown_timeout_secs);
    api.max_body_size = server.max_body_size;

    Ok(api)
}

/// Creates every seed account that does not exist yet.
pub async fn seed_accounts(users: &UserService, seed: &SeedConfig) -> BinResult<()> {
    for entry in &seed.users {
        let role = Role::parse(&entry.role).ok_or_else(|| BinError::UnknownSeedRole {
            email: entry.email.clone(),
            role: entry.role.clone(),
        })?;
        users
            .provision(
                &entry.email,
                entry.password.expose(),
                role,
                &entry.first_name,
                &entry.last_name,
            )
            .await
            .map_err(|e| BinError::seed(&entry.email, e))?;
    }
    if !seed.users.is_empty() {
        info!(count = seed.users.len(), "Seed accounts ready");
    }
    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<TktConfig>,
    port: Option<u16>,
    seed: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            seed: true,
            ..Default::default()
        }
    }

    /// Sets the configuration file path. Without one, defaults plus
    /// environment overrides are used.
    pub fn config_path(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.config_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: TktConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the configured port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Enables or disables seed accounts.
    pub fn seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => load(&path)?,
            (None, None) => ConfigLoader::new()
                .load_defaults()
                .map_err(|e| BinError::from(e).with_context("No config file; defaults invalid"))?,
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(ServiceRuntime::new(config).with_seed(self.seed))
    }
}

/// Loads and validates a config file.
pub fn load(path: &Path) -> BinResult<TktConfig> {
    ConfigLoader::new().load(path).map_err(|e| {
        BinError::from(e).with_context(format!("Failed to load config from {}", path.display()))
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tkt_config::{SecretValue, SeedUser};

    fn test_config() -> TktConfig {
        let mut config = TktConfig::default();
        config.auth.jwt_secret = SecretValue::new("runtime-test-secret-that-is-long-enough");
        config
    }

    #[test]
    fn test_build_api_config() {
        let mut config = test_config();
        config.server.port = 9001;
        config.server.base_path = "/api/v2/".into();
        config.server.cors_origins = vec!["https://app.example.com".into()];
        config.auth.algorithm = "HS384".into();
        config.cookie.domain = "tickets.example.com".into();

        let api = build_api_config(&config).unwrap();
        assert_eq!(api.port, 9001);
        assert_eq!(api.base_path, "/api/v2");
        assert!(!api.cors.is_wildcard());
        let hs384 = JwtConfig::new("x").with_algorithm_name("HS384").unwrap();
        assert_eq!(api.jwt.algorithm, hs384.algorithm);
        assert_eq!(api.cookie.domain, "tickets.example.com");
        assert_eq!(api.jwt.access_ttl_secs, 900);
    }

    #[test]
    fn test_bad_host_is_config_error() {
        let mut config = test_config();
        config.server.host = "not-an-ip".into();
        assert_eq!(build_api_config(&config).unwrap_err().exit_code(), 1);
    }

    #[test]
    fn test_runtime_builder_port_override() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .port(Some(9100))
            .build()
            .unwrap();
        assert_eq!(runtime.config().server.port, 9100);
    }

    #[test]
    fn test_runtime_builder_missing_file() {
        let result = RuntimeBuilder::new()
            .config_path(Some("/nonexistent/tkt.yaml"))
            .build();
        assert_eq!(result.err().map(|e| e.exit_code()), Some(1));
    }

    #[tokio::test]
    async fn test_prepare_seeds_accounts_once() {
        let mut config = test_config();
        config.seed.users.push(SeedUser {
            email: "admin@example.com".into(),
            password: SecretValue::new("changeme"),
            role: "admin".into(),
            first_name: "Ada".into(),
            last_name: "Admin".into(),
        });

        let runtime = ServiceRuntime::new(config);
        let server = runtime.prepare().await.unwrap();
        let users = server.state().users.clone();

        seed_accounts(&users, &runtime.config().seed).await.unwrap();

        let admin = tkt_core::Identity::new(tkt_core::UserId::new(), Role::Admin);
        let accounts = users.list(&admin).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, Role::Admin);
    }

    fn seed_entry(email: &str, role: &str) -> SeedConfig {
        SeedConfig {
            users: vec![SeedUser {
                email: email.into(),
                password: SecretValue::new("changeme"),
                role: role.into(),
                first_name: String::new(),
                last_name: String::new(),
            }],
        }
    }

    struct BrokenHasher;

    impl tkt_core::CredentialVerifier for BrokenHasher {
        fn hash(&self, _password: &str) -> Result<String, tkt_core::CoreError> {
            Err(tkt_core::CoreError::Credential("no entropy".into()))
        }

        fn check(&self, _hash: &str, _candidate: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_seed_rejects_unknown_role() {
        let users = UserService::new(
            Arc::new(tkt_core::store::InMemorySubjectStore::new()),
            Arc::new(tkt_api::auth::Argon2Verifier::new()),
        );
        let err = seed_accounts(&users, &seed_entry("root@example.com", "superuser"))
            .await
            .unwrap_err();
        assert!(matches!(err, BinError::UnknownSeedRole { ref role, .. } if role == "superuser"));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_seed_failure_names_the_account() {
        let users = UserService::new(
            Arc::new(tkt_core::store::InMemorySubjectStore::new()),
            Arc::new(BrokenHasher),
        );
        let err = seed_accounts(&users, &seed_entry("ops@example.com", "agent"))
            .await
            .unwrap_err();
        assert!(matches!(err, BinError::Seed { ref email, .. } if email == "ops@example.com"));
        assert_eq!(err.exit_code(), 5);
    }
}
