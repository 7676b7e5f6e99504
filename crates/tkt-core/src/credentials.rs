// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing capability.
//!
//! The services never see a hashing algorithm. They consume this trait,
//! and the API crate supplies the concrete implementation.
//!
//! Hashing is CPU-bound, so async callers go through
//! [`hash_off_runtime`] and [`check_off_runtime`], which move the work onto
//! the blocking pool.

use std::sync::Arc;

use tracing::error;

use crate::error::CoreError;

/// Hashes new passwords and checks candidates against stored hashes.
pub trait CredentialVerifier: Send + Sync {
    /// Produces an encoded hash for `password`.
    fn hash(&self, password: &str) -> Result<String, CoreError>;

    /// Returns `true` if `candidate` matches `hash`.
    ///
    /// A malformed stored hash is a mismatch, not an error.
    fn check(&self, hash: &str, candidate: &str) -> bool;
}

/// Shared verifier handle.
pub type SharedCredentialVerifier = Arc<dyn CredentialVerifier>;

/// Hashes `password` on the blocking thread pool.
pub async fn hash_off_runtime(
    verifier: &SharedCredentialVerifier,
    password: &str,
) -> Result<String, CoreError> {
    let verifier = Arc::clone(verifier);
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verifier.hash(&password))
        .await
        .map_err(|e| CoreError::Credential(format!("hashing task failed: {e}")))?
}

/// Checks `candidate` against `hash` on the blocking thread pool.
///
/// A task that fails to complete counts as a mismatch.
pub async fn check_off_runtime(
    verifier: &SharedCredentialVerifier,
    hash: &str,
    candidate: &str,
) -> bool {
    let verifier = Arc::clone(verifier);
    let hash = hash.to_owned();
    let candidate = candidate.to_owned();
    match tokio::task::spawn_blocking(move || verifier.check(&hash, &candidate)).await {
        Ok(matched) => matched,
        Err(e) => {
            error!(error = %e, "Credential check task failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reversed;

    impl CredentialVerifier for Reversed {
        fn hash(&self, password: &str) -> Result<String, CoreError> {
            if password.is_empty() {
                return Err(CoreError::Credential("empty".into()));
            }
            Ok(password.chars().rev().collect())
        }

        fn check(&self, hash: &str, candidate: &str) -> bool {
            self.hash(candidate).map(|h| h == hash).unwrap_or(false)
        }
    }

    #[tokio::test]
    async fn test_off_runtime_helpers() {
        let verifier: SharedCredentialVerifier = Arc::new(Reversed);
        let hash = hash_off_runtime(&verifier, "abc").await.unwrap();
        assert_eq!(hash, "cba");
        assert!(check_off_runtime(&verifier, &hash, "abc").await);
        assert!(!check_off_runtime(&verifier, &hash, "abd").await);
        assert!(matches!(
            hash_off_runtime(&verifier, "").await,
            Err(CoreError::Credential(_))
        ));
    }
}
