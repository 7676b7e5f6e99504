// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account records.
//!
//! An [`Account`] is the persisted identity behind a token subject. The
//! password hash is opaque to this crate and is never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Role, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier (token subject).
    pub id: UserId,
    /// Login email, unique case-insensitively.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Current role.
    pub role: Role,
    /// Encoded password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account with a fresh identifier.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: normalize_email(&email.into()),
            first_name: String::new(),
            last_name: String::new(),
            role,
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Returns the public view of this account.
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }
}

/// The parts of an account any authenticated caller may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Account identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Current role.
    pub role: Role,
}

/// Input for self-service signup.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    /// Login email.
    pub email: String,
    /// Plain-text password. Hashed before it reaches a store.
    pub password: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
}

impl Signup {
    /// Validates the signup request.
    pub fn validate(&self) -> Result<(), CoreError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CoreError::validation("email must not be empty"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(CoreError::validation("email is not valid")),
        }
        if self.password.is_empty() {
            return Err(CoreError::validation("password must not be empty"));
        }
        Ok(())
    }
}

/// Canonical form used for email lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let account = Account::new("A@Example.com", "$argon2id$secret", Role::User);
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
        assert_eq!(account.email, "a@example.com");
    }

    #[test]
    fn test_profile() {
        let account = Account::new("b@example.com", "h", Role::Agent).with_name("Bea", "Lee");
        let profile = account.profile();
        assert_eq!(profile.id, account.id);
        assert_eq!(profile.first_name, "Bea");
        assert_eq!(profile.role, Role::Agent);
    }

    #[test]
    fn test_signup_validation() {
        let ok = Signup {
            email: "c@example.com".into(),
            password: "pw".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = Signup {
            email: "nope".into(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let no_password = Signup {
            password: String::new(),
            ..ok
        };
        assert!(no_password.validate().is_err());
    }
}
