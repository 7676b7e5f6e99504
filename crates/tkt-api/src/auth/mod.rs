// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and session module.
//!
//! This module provides:
//! - JWT token codec (access and refresh tokens)
//! - Session manager (login, refresh rotation, logout)
//! - Refresh cookie policy
//! - Argon2 credential verifier
//! - Authentication context and bearer verification

mod claims;
mod context;
mod cookie;
mod credentials;
mod error;
mod jwt;
mod session;

pub use claims::{AccessClaims, RefreshClaims};
pub use context::{parse_bearer, require_admin, verify_admin_context, verify_bearer_token, AuthContext};
pub use cookie::{parse_cookie, CookieConfig, CookiePolicy};
pub use credentials::{hash_password, Argon2Verifier};
pub use error::AuthError;
pub use jwt::{JwtConfig, TokenCodec, TokenPair};
pub use session::{IssuedSession, SessionManager};
