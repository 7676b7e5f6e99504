// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2 credential verifier.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, SaltString};

use tkt_core::{CoreError, CredentialVerifier};

/// Hashes and verifies passwords as argon2id PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    /// Creates a verifier with the default argon2id parameters.
    pub fn new() -> Self {
        Self
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String, CoreError> {
        hash_password(password)
    }

    fn check(&self, hash: &str, candidate: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Credential(e.to_string()))?;
    Ok(phc.to_string())
}
