// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

use super::claims::AccessClaims;
use super::error::AuthError;
use super::jwt::TokenCodec;
use tkt_core::{Identity, Role, UserId};

/// Authentication context for a request.
///
/// Attached to request extensions after the bearer token verifies.
/// Immutable for the rest of the request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuthContext {
    /// Verified subject and role.
    pub identity: Identity,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a new context for `identity`.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates a context from verified access claims.
    pub fn from_claims(claims: &AccessClaims) -> Self {
        Self::new(claims.identity())
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the subject ID.
    pub fn user_id(&self) -> UserId {
        self.identity.subject
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Returns `true` if this context has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Extracts the token from an `Authorization: Bearer <token>` value.
///
/// The value must split into exactly two whitespace-separated parts, the
/// first being `Bearer`.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Turns the request's `Authorization` header into a verified context.
pub fn verify_bearer_token(codec: &TokenCodec, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::NoHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let token = parse_bearer(value)?;
    let claims = codec.verify_access_token(token)?;
    Ok(AuthContext::from_claims(&claims))
}

/// Like [`verify_bearer_token`], additionally requiring the admin role.
pub fn verify_admin_context(codec: &TokenCodec, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let context = verify_bearer_token(codec, headers)?;
    require_admin(&context)?;
    Ok(context)
}

/// Fails with [`AuthError::Forbidden`] unless the context is an admin.
pub fn require_admin(context: &AuthContext) -> Result<(), AuthError> {
    if context.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use axum::http::HeaderValue;

    fn codec() -> TokenCodec {
        TokenCodec::new(JwtConfig::new("context-test-secret-long-enough-for-hs256")).unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("bearer abc"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Bearer"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Bearer a b"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Basic abc"), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_verify_bearer_token() {
        let codec = codec();
        let identity = Identity::new(UserId::new(), Role::User);
        let token = codec.issue_access_token(&identity).unwrap();

        let ctx = verify_bearer_token(&codec, &headers(&format!("Bearer {token}"))).unwrap();
        assert_eq!(ctx.identity, identity);
        assert!(!ctx.is_admin());

        assert_eq!(
            verify_bearer_token(&codec, &HeaderMap::new()).unwrap_err(),
            AuthError::NoHeader
        );
        assert_eq!(
            verify_bearer_token(&codec, &headers("Bearer garbage")).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_verify_admin_context() {
        let codec = codec();
        let user = codec
            .issue_access_token(&Identity::new(UserId::new(), Role::Agent))
            .unwrap();
        let admin = codec
            .issue_access_token(&Identity::new(UserId::new(), Role::Admin))
            .unwrap();

        assert_eq!(
            verify_admin_context(&codec, &headers(&format!("Bearer {user}"))).unwrap_err(),
            AuthError::Forbidden
        );
        assert!(verify_admin_context(&codec, &headers(&format!("Bearer {admin}"))).is_ok());
    }
}
