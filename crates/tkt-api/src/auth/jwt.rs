// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token codec.
//!
//! Issues and verifies the two token kinds used by the session protocol:
//!
//! - **access**: `{sub, iss, aud, iat, nbf, exp, role}`, sent as a bearer token
//! - **refresh**: `{sub, exp}`, only ever carried in the refresh cookie
//!
//! Only HMAC algorithms are accepted, and no clock leeway is applied.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::claims::{AccessClaims, RefreshClaims};
use super::error::AuthError;
use tkt_core::{Identity, UserId};

/// Algorithms the codec will sign with or accept.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Issuer written to and required of access tokens.
    pub issuer: String,
    /// Audience written to and required of access tokens.
    pub audience: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// HMAC algorithm to sign with.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "example.com".to_string(),
            audience: "example.com".to_string(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 24 * 60 * 60,
            algorithm: Algorithm::HS256,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }

    /// Sets the signing algorithm by name (`HS256`, `HS384` or `HS512`).
    pub fn with_algorithm_name(mut self, name: &str) -> Result<Self, AuthError> {
        self.algorithm = parse_algorithm(name)
            .ok_or_else(|| AuthError::Signing(format!("unsupported algorithm '{}'", name)))?;
        Ok(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::Signing("JWT secret is not configured".into()));
        }
        if !HMAC_ALGORITHMS.contains(&self.algorithm) {
            return Err(AuthError::Signing(format!(
                "algorithm {:?} is not an HMAC algorithm",
                self.algorithm
            )));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// TokenPair
// =============================================================================

/// An access token and its companion refresh token.
///
/// The refresh half is moved into a cookie as soon as the pair is issued.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Cookie-only token for rotation.
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Creates and verifies signed tokens.
///
/// Cheap to clone; keys and validation rules are shared.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    access_validation: Arc<Validation>,
    refresh_validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a new codec.
    ///
    /// Fails with [`AuthError::Signing`] if the secret is empty or the
    /// algorithm is not HMAC.
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut access_validation = Validation::new(config.algorithm);
        access_validation.algorithms = HMAC_ALGORITHMS.to_vec();
        access_validation.leeway = 0;
        access_validation.set_issuer(&[&config.issuer]);
        access_validation.set_audience(&[&config.audience]);
        access_validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let mut refresh_validation = Validation::new(config.algorithm);
        refresh_validation.algorithms = HMAC_ALGORITHMS.to_vec();
        refresh_validation.leeway = 0;
        refresh_validation.validate_aud = false;
        refresh_validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            access_validation: Arc::new(access_validation),
            refresh_validation: Arc::new(refresh_validation),
        })
    }

    /// Signs arbitrary access claims.
    pub fn encode_access(&self, claims: &AccessClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Signs arbitrary refresh claims.
    pub fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Issues an access token bound to `identity`.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let claims = AccessClaims::new(
            identity,
            &self.config.issuer,
            &self.config.audience,
            self.config.access_ttl_secs,
        );
        self.encode_access(&claims)
    }

    /// Issues a refresh token for `subject`.
    pub fn issue_refresh_token(&self, subject: UserId) -> Result<String, AuthError> {
        self.encode_refresh(&RefreshClaims::new(subject, self.config.refresh_ttl_secs))
    }

    /// Issues an access/refresh pair for `identity`.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(identity)?,
            refresh_token: self.issue_refresh_token(identity.subject)?,
        })
    }

    /// Verifies an access token: HMAC signature, issuer, audience and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.access_validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Verifies a refresh token: HMAC signature and expiry.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.decoding_key, &self.refresh_validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Returns the access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Returns the refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("algorithm", &self.config.algorithm)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .finish()
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        kind => {
            debug!(reason = ?kind, "Token rejected");
            AuthError::MalformedToken
        }
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

/// Parses an HMAC algorithm name case-insensitively.
fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name.trim().to_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_algorithm(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "Unsupported algorithm: {} (expected HS256, HS384 or HS512)",
                s
            ))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
