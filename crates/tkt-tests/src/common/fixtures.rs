// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Known accounts, signing configuration and config-file documents shared
//! by the integration suites.

use tkt_api::{ApiConfig, JwtConfig};
use tkt_core::{Account, Identity, Role, UserId, UserService};

/// Signing secret used by every test codec.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Password shared by every seeded account.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Token settings for tests.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

/// API settings for tests: defaults with the test secret.
pub fn test_api_config() -> ApiConfig {
    ApiConfig::default().with_jwt(test_jwt_config())
}

/// An identity with a fresh subject.
pub fn identity(role: Role) -> Identity {
    Identity::new(UserId::new(), role)
}

/// The identity an account's tokens carry.
pub fn identity_of(account: &Account) -> Identity {
    Identity::new(account.id, account.role)
}

// =============================================================================
// Cast
// =============================================================================

/// The accounts every scenario starts with.
#[derive(Debug, Clone)]
pub struct Cast {
    /// Opens tickets.
    pub alice: Account,
    /// A second user who must not see Alice's tickets.
    pub bob: Account,
    /// An agent.
    pub agent: Account,
    /// An agent never assigned to anything.
    pub idle_agent: Account,
    /// An admin.
    pub admin: Account,
}

impl Cast {
    /// Provisions the cast through the account service.
    pub async fn seed(users: &UserService) -> Self {
        let seed = |email: &'static str, role: Role, first: &'static str| async move {
            users
                .provision(email, TEST_PASSWORD, role, first, "Test")
                .await
                .expect("seed account")
        };

        Self {
            alice: seed("alice@example.com", Role::User, "Alice").await,
            bob: seed("bob@example.com", Role::User, "Bob").await,
            agent: seed("agent@example.com", Role::Agent, "Agnes").await,
            idle_agent: seed("idle@example.com", Role::Agent, "Ike").await,
            admin: seed("admin@example.com", Role::Admin, "Ada").await,
        }
    }
}

// =============================================================================
// Config documents
// =============================================================================

/// A complete YAML configuration.
pub const FULL_YAML: &str = r#"
server:
  host: 127.0.0.1
  port: 9090
  base_path: /api/v1
  cors_origins:
    - https://tickets.example.com
  conceal_forbidden_tickets: false
  request_timeout_secs: 10
auth:
  jwt_secret: "yaml-fixture-secret-that-is-long-enough"
  issuer: tickets.example.com
  audience: tickets.example.com
  access_token_ttl_secs: 600
  refresh_token_ttl_secs: 7200
  algorithm: HS512
cookie:
  name: tkt-refresh
  path: /api
  domain: tickets.example.com
logging:
  level: debug
  format: json
seed:
  users:
    - email: admin@example.com
      password: "${TKT_TEST_ADMIN_PASSWORD:fallback-password}"
      role: admin
      first_name: Ada
"#;

/// The smallest valid TOML configuration.
pub const MINIMAL_TOML: &str = r#"
[auth]
jwt_secret = "toml-fixture-secret-that-is-long-enough"
"#;

/// A JSON configuration with a seed account.
pub const SEEDED_JSON: &str = r#"{
  "auth": { "jwt_secret": "json-fixture-secret-that-is-long-enough" },
  "seed": { "users": [ { "email": "agent@example.com", "password": "pw", "role": "agent" } ] }
}"#;
