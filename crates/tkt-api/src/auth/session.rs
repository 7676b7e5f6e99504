// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session manager: login, refresh rotation and logout.
//!
//! Sessions are stateless. Login and refresh both mint a fresh
//! [`TokenPair`](super::TokenPair); the access half goes back to the
//! caller, the refresh half is wrapped in a `Set-Cookie` directive.
//! Refresh re-reads the subject's role from the store, so a role change
//! takes effect on the next rotation.

use axum::http::HeaderMap;
use tracing::{debug, info};

use super::cookie::CookiePolicy;
use super::error::AuthError;
use super::jwt::TokenCodec;
use tkt_core::store::SharedSubjectStore;
use tkt_core::{check_off_runtime, Identity, SharedCredentialVerifier, StoreError};

/// Well-formed argon2id hash with the default parameters, checked when the
/// email is unknown so both rejection paths do the same work.
const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGt0LWxvZ2luLWR1bW15IQ$BwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAhIiMkJSY";

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Who the tokens were issued to.
    pub identity: Identity,
    /// Bearer token for the response body.
    pub access_token: String,
    /// `Set-Cookie` value carrying the refresh token.
    pub set_cookie: String,
}

/// Orchestrates the session protocol.
#[derive(Clone)]
pub struct SessionManager {
    codec: TokenCodec,
    subjects: SharedSubjectStore,
    credentials: SharedCredentialVerifier,
    cookies: CookiePolicy,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        codec: TokenCodec,
        subjects: SharedSubjectStore,
        credentials: SharedCredentialVerifier,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            codec,
            subjects,
            credentials,
            cookies,
        }
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the cookie policy.
    pub fn cookies(&self) -> &CookiePolicy {
        &self.cookies
    }

    /// Authenticates by email and password.
    ///
    /// An unknown email and a wrong password both fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let account = match self.subjects.get_by_email(email).await {
            Ok(account) => account,
            Err(StoreError::NotFound { .. }) => {
                check_off_runtime(&self.credentials, UNKNOWN_ACCOUNT_HASH, password).await;
                debug!("Login rejected: no account for email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Unavailable(e.to_string())),
        };

        if !check_off_runtime(&self.credentials, &account.password_hash, password).await {
            debug!(user_id = %account.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue(Identity::new(account.id, account.role))?;
        info!(user_id = %account.id, role = %account.role, "User logged in");
        Ok(session)
    }

    /// Rotates a session from the refresh cookie value.
    ///
    /// Any failure, including a subject that no longer exists, is
    /// [`AuthError::Unauthorized`].
    pub async fn refresh(&self, cookie: Option<&str>) -> Result<IssuedSession, AuthError> {
        let token = cookie.ok_or(AuthError::Unauthorized)?;
        let claims = self.codec.verify_refresh_token(token).map_err(|e| {
            debug!(reason = %e, "Refresh rejected");
            AuthError::Unauthorized
        })?;

        let account = match self.subjects.get_by_id(&claims.sub).await {
            Ok(account) => account,
            Err(StoreError::NotFound { .. }) => {
                debug!(user_id = %claims.sub, "Refresh rejected: subject no longer exists");
                return Err(AuthError::Unauthorized);
            }
            Err(e) => return Err(AuthError::Unavailable(e.to_string())),
        };

        let session = self.issue(Identity::new(account.id, account.role))?;
        debug!(user_id = %account.id, role = %account.role, "Session refreshed");
        Ok(session)
    }

    /// Rotates a session using the refresh cookie found in `headers`.
    pub async fn refresh_from_headers(&self, headers: &HeaderMap) -> Result<IssuedSession, AuthError> {
        let cookie = self.cookies.read(headers);
        self.refresh(cookie.as_deref()).await
    }

    /// Returns the `Set-Cookie` value that clears the refresh cookie.
    pub fn logout(&self) -> String {
        self.cookies.expire()
    }

    fn issue(&self, identity: Identity) -> Result<IssuedSession, AuthError> {
        let pair = self.codec.issue_pair(&identity)?;
        Ok(IssuedSession {
            identity,
            access_token: pair.access_token,
            set_cookie: self.cookies.issue(&pair.refresh_token),
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .field("cookies", &self.cookies)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cookie::CookieConfig;
    use crate::auth::credentials::Argon2Verifier;
    use crate::auth::jwt::JwtConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tkt_core::store::InMemorySubjectStore;
    use tkt_core::{Account, CredentialVerifier, Role, SubjectStore};

    struct Setup {
        sessions: SessionManager,
        subjects: Arc<InMemorySubjectStore>,
        account: Account,
    }

    async fn setup() -> Setup {
        let subjects = Arc::new(InMemorySubjectStore::new());
        let verifier = Arc::new(Argon2Verifier::new());
        let account = subjects
            .create(Account::new(
                "dana@example.com",
                verifier.hash("s3cret").unwrap(),
                Role::User,
            ))
            .await
            .unwrap();
        let codec = TokenCodec::new(JwtConfig::new("session-test-secret-long-enough-000")).unwrap();
        let cookies = CookiePolicy::new(CookieConfig::default(), codec.refresh_ttl_secs());
        let sessions = SessionManager::new(codec, subjects.clone(), verifier, cookies);
        Setup {
            sessions,
            subjects,
            account,
        }
    }

    fn cookie_value(set_cookie: &str) -> String {
        let first = set_cookie.split(';').next().unwrap();
        first.split_once('=').unwrap().1.to_string()
    }

    #[tokio::test]
    async fn test_login_issues_bound_tokens() {
        let s = setup().await;
        let session = s.sessions.login("Dana@example.com", "s3cret").await.unwrap();
        assert_eq!(session.identity.subject, s.account.id);
        assert!(session.set_cookie.contains("HttpOnly"));

        let claims = s.sessions.codec().verify_access_token(&session.access_token).unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let s = setup().await;
        let wrong_password = s.sessions.login("dana@example.com", "nope").await.unwrap_err();
        let no_account = s.sessions.login("nobody@example.com", "s3cret").await.unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(no_account, AuthError::InvalidCredentials);
    }

    /// Counts `check` calls and delegates to argon2.
    #[derive(Default)]
    struct CountingVerifier {
        inner: Argon2Verifier,
        checks: AtomicUsize,
    }

    impl CredentialVerifier for CountingVerifier {
        fn hash(&self, password: &str) -> Result<String, tkt_core::CoreError> {
            self.inner.hash(password)
        }

        fn check(&self, hash: &str, candidate: &str) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.inner.check(hash, candidate)
        }
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_credential_check() {
        let subjects = Arc::new(InMemorySubjectStore::new());
        let verifier = Arc::new(CountingVerifier::default());
        subjects
            .create(Account::new(
                "erin@example.com",
                verifier.hash("s3cret").unwrap(),
                Role::User,
            ))
            .await
            .unwrap();
        let codec = TokenCodec::new(JwtConfig::new("session-test-secret-long-enough-000")).unwrap();
        let cookies = CookiePolicy::new(CookieConfig::default(), codec.refresh_ttl_secs());
        let sessions = SessionManager::new(codec, subjects, verifier.clone(), cookies);

        sessions.login("erin@example.com", "wrong").await.unwrap_err();
        let existing = verifier.checks.swap(0, Ordering::SeqCst);
        sessions.login("nobody@example.com", "wrong").await.unwrap_err();
        let missing = verifier.checks.load(Ordering::SeqCst);

        assert_eq!(existing, 1);
        assert_eq!(missing, existing);
    }

    #[test]
    fn test_unknown_account_hash_is_well_formed() {
        assert!(password_hash::PasswordHash::new(UNKNOWN_ACCOUNT_HASH).is_ok());
        assert!(!Argon2Verifier::new().check(UNKNOWN_ACCOUNT_HASH, "s3cret"));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_role_change() {
        let s = setup().await;
        let session = s.sessions.login("dana@example.com", "s3cret").await.unwrap();
        let refresh_token = cookie_value(&session.set_cookie);

        let mut account = s.account.clone();
        account.role = Role::Agent;
        s.subjects.update(account).await.unwrap();

        let rotated = s.sessions.refresh(Some(&refresh_token)).await.unwrap();
        let claims = s.sessions.codec().verify_access_token(&rotated.access_token).unwrap();
        assert_eq!(claims.role, Role::Agent);
        assert_eq!(rotated.identity.role, Role::Agent);
    }

    #[tokio::test]
    async fn test_refresh_failures() {
        let s = setup().await;
        assert_eq!(s.sessions.refresh(None).await.unwrap_err(), AuthError::Unauthorized);
        assert_eq!(
            s.sessions.refresh(Some("garbage")).await.unwrap_err(),
            AuthError::Unauthorized
        );

        let session = s.sessions.login("dana@example.com", "s3cret").await.unwrap();
        assert_eq!(
            s.sessions.refresh(Some(&session.access_token)).await.unwrap_err(),
            AuthError::Unauthorized
        );

        let refresh_token = cookie_value(&session.set_cookie);
        s.subjects.delete(&s.account.id).await.unwrap();
        assert_eq!(
            s.sessions.refresh(Some(&refresh_token)).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let s = setup().await;
        let cookie = s.sessions.logout();
        assert!(cookie.starts_with("tapp-refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
