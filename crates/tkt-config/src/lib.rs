// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tkt-config
//!
//! Configuration management for the tkt ticket service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tkt_config::loader::load_config;
//!
//! let config = load_config("tkt.yaml").unwrap();
//!
//! println!("Port: {}", config.server.port);
//! println!("Seed accounts: {}", config.seed.users.len());
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - bind address, base path, CORS and request limits
//! - `auth` - token secret, issuer, audience and lifetimes
//! - `cookie` - refresh cookie name, path and domain
//! - `logging` - level and output format
//! - `seed` - accounts provisioned at startup
//!
//! ## Environment Variables
//!
//! ```text
//! TKT_JWT_SECRET=...
//! TKT_PORT=9090
//! TKT_LOG_LEVEL=debug
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! auth:
//!   jwt_secret: "${TKT_SECRET:dev-only-secret}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    AuthConfig, CookieConfig, LogFormat, LogLevel, LoggingConfig, SecretValue, SeedConfig,
    SeedUser, ServerConfig, TktConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
