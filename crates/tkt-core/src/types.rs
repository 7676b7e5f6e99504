// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core identifier and identity types.
//!
//! This module provides the fundamental types shared by every tkt crate:
//!
//! - [`UserId`], [`TicketId`], [`CommentId`]: UUID-backed identifiers
//! - [`Role`]: the closed set of roles recognized by the access policy
//! - [`Identity`]: a verified `(subject, role)` pair
//!
//! Identifiers are time-ordered UUIDs (v7) when generated locally, and
//! accept any valid UUID when parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[inline]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID.
            #[inline]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses an identifier from its canonical string form.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s.trim()).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier of an account (the token subject).
    UserId
}

uuid_id! {
    /// Unique identifier of a ticket.
    TicketId
}

uuid_id! {
    /// Unique identifier of a comment.
    CommentId
}

// =============================================================================
// Role
// =============================================================================

/// Role of an authenticated subject.
///
/// `Unknown` absorbs any role string the system does not recognize, so a
/// token or stored record carrying a foreign role deserializes successfully
/// and is then denied by every policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Opens tickets and follows up on their own.
    User,
    /// Works on tickets they are assigned to.
    Agent,
    /// Full access to tickets and accounts.
    Admin,
    /// Unrecognized role. Denied everywhere.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Returns the role name as stored in tokens and records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }

    /// Parses a role name case-insensitively.
    ///
    /// Returns `None` for anything outside the recognized set, including
    /// the literal `"unknown"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "agent" => Some(Role::Agent),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns the roles that may be granted to an account.
    pub fn assignable() -> &'static [Role] {
        &[Role::User, Role::Agent, Role::Admin]
    }

    /// Returns `true` for the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Identity
// =============================================================================

/// A verified subject and the role it acts under.
///
/// Produced by token verification and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The account the request acts for.
    pub subject: UserId,
    /// The role granted by the token.
    pub role: Role,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(subject: UserId, role: Role) -> Self {
        Self { subject, role }
    }

    /// Returns `true` if this identity holds the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns `true` if this identity acts for the given account.
    #[inline]
    pub fn is(&self, user: &UserId) -> bool {
        &self.subject == user
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_and_display() {
        let id = TicketId::new();
        let parsed = TicketId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(TicketId::parse("not-a-uuid").is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" agent "), Some(Role::Agent));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("unknown"), None);
    }

    #[test]
    fn test_role_unknown_deserializes() {
        let role: Role = serde_json::from_str("\"root\"").unwrap();
        assert_eq!(role, Role::Unknown);

        let role: Role = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, Role::Agent);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_identity() {
        let subject = UserId::new();
        let identity = Identity::new(subject, Role::Admin);
        assert!(identity.is_admin());
        assert!(identity.is(&subject));
        assert!(!identity.is(&UserId::new()));
    }
}
