// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication errors.
//!
//! These are the outcomes of token verification and the session protocol.
//! Messages are safe to return to clients; the cause of a credential
//! mismatch is only ever logged.

use thiserror::Error;

/// Errors raised while authenticating a request or managing a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("authorization header is missing")]
    NoHeader,

    /// `Authorization` header is not `Bearer <token>`.
    #[error("authorization header is malformed")]
    MalformedHeader,

    /// Token signature verified but the token is past its expiry.
    #[error("token has expired")]
    ExpiredToken,

    /// Token was issued by someone else.
    #[error("token issuer is invalid")]
    InvalidIssuer,

    /// Any other reason the token could not be accepted.
    #[error("token is malformed or invalid")]
    MalformedToken,

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Refresh failed: cookie absent, bad, expired, or subject gone.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but not as an admin.
    #[error("forbidden")]
    Forbidden,

    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// The account store failed while authenticating.
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Returns a stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::NoHeader => "AUTH_HEADER_MISSING",
            AuthError::MalformedHeader => "AUTH_HEADER_MALFORMED",
            AuthError::ExpiredToken => "TOKEN_EXPIRED",
            AuthError::InvalidIssuer => "TOKEN_ISSUER_INVALID",
            AuthError::MalformedToken => "TOKEN_INVALID",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::Signing(_) => "TOKEN_SIGNING_FAILED",
            AuthError::Unavailable(_) => "AUTH_UNAVAILABLE",
        }
    }

    /// Returns `true` if this is a server-side failure rather than a client one.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Signing(_) | AuthError::Unavailable(_))
    }
}
