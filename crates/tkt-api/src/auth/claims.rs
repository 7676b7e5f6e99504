// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tkt_core::{Identity, Role, UserId};

// =============================================================================
// AccessClaims
// =============================================================================

/// Claims of a short-lived access token.
///
/// The role claim is authoritative for the token's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the account ID.
    pub sub: UserId,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Not before time (Unix timestamp).
    pub nbf: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Role granted for the lifetime of the token.
    pub role: Role,
}

impl AccessClaims {
    /// Creates access claims for `identity`, valid for `ttl_secs` from now.
    pub fn new(
        identity: &Identity,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: identity.subject,
            iss: issuer.into(),
            aud: audience.into(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl_secs),
            role: identity.role,
        }
    }

    /// Returns the identity these claims assert.
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.role)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// =============================================================================
// RefreshClaims
// =============================================================================

/// Claims of a refresh token: subject and expiry, nothing else.
///
/// Unknown fields are rejected so an access token can never be replayed as
/// a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    /// Subject: the account ID.
    pub sub: UserId,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl RefreshClaims {
    /// Creates refresh claims for `subject`, valid for `ttl_secs` from now.
    pub fn new(subject: UserId, ttl_secs: i64) -> Self {
        Self {
            sub: subject,
            exp: Utc::now().timestamp().saturating_add(ttl_secs),
        }
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims() {
        let identity = Identity::new(UserId::new(), Role::Agent);
        let claims = AccessClaims::new(&identity, "example.com", "example.com", 900);
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.is_expired());
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_expiry_saturates_on_huge_lifetime() {
        let identity = Identity::new(UserId::new(), Role::User);
        let access = AccessClaims::new(&identity, "iss", "aud", i64::MAX);
        assert_eq!(access.exp, i64::MAX);
        assert!(!access.is_expired());

        let refresh = RefreshClaims::new(identity.subject, i64::MAX);
        assert_eq!(refresh.exp, i64::MAX);
    }

    #[test]
    fn test_refresh_claims_reject_access_shape() {
        let identity = Identity::new(UserId::new(), Role::User);
        let access = AccessClaims::new(&identity, "iss", "aud", 60);
        let json = serde_json::to_string(&access).unwrap();
        assert!(serde_json::from_str::<RefreshClaims>(&json).is_err());

        let refresh = RefreshClaims::new(identity.subject, 60);
        let json = serde_json::to_value(&refresh).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
