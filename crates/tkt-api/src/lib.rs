// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tkt-api
//!
//! HTTP API for the tkt ticket tracker.
//!
//! This crate provides the JWT session protocol (access tokens in the
//! response body, refresh tokens in an `HttpOnly` cookie), the bearer
//! authentication layer, and the Axum router over the core services.
//!
//! ```rust,ignore
//! use tkt_api::{ApiConfig, ApiServerBuilder, JwtConfig};
//!
//! let config = ApiConfig::default().with_jwt(JwtConfig::new(secret));
//! let server = ApiServerBuilder::new().config(config).build()?;
//! server.run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AuthContext, AuthError, CookieConfig, CookiePolicy, JwtConfig, SessionManager, TokenCodec,
};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
