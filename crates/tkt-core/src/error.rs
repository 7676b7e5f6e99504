// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core error hierarchy.
//!
//! ```text
//! CoreError
//! ├── AccessDenied        - policy said no
//! ├── InvalidTransition   - state machine said no
//! ├── Validation          - malformed input
//! ├── NotFound            - referenced record does not exist
//! ├── Conflict            - duplicate or concurrent modification
//! ├── Store               - storage backend failure
//! └── Credential          - password hashing failure
//! ```
//!
//! Store implementations report [`StoreError`], which converts into
//! [`CoreError`] at the service boundary. Neither type carries HTTP
//! knowledge; the API layer maps [`ErrorCategory`] to status codes.

use thiserror::Error;

use crate::ticket::TicketState;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// ErrorCategory
// =============================================================================

/// Coarse classification used by outer layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller lacks permission.
    Authorization,
    /// Input rejected.
    Validation,
    /// Referenced record is missing.
    NotFound,
    /// State changed underneath the caller, or a uniqueness rule was hit.
    Conflict,
    /// Something broke on our side.
    Infrastructure,
}

// =============================================================================
// CoreError
// =============================================================================

/// Errors produced by the policy engine, state machine and services.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The single denial value returned by every policy check.
    #[error("access denied: insufficient permissions")]
    AccessDenied,

    /// A state change outside the allow-list.
    #[error("cannot transition ticket from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: TicketState,
        /// Requested state.
        to: TicketState,
    },

    /// Invalid input.
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },

    /// Referenced record does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Kind of record.
        resource: String,
    },

    /// Duplicate key or concurrent modification.
    #[error("conflict: {message}")]
    Conflict {
        /// What collided.
        message: String,
    },

    /// Storage backend failure.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),

    /// Password hashing backend failure.
    #[error("credential processing failed: {0}")]
    Credential(String),
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Returns the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::AccessDenied => ErrorCategory::Authorization,
            CoreError::InvalidTransition { .. } | CoreError::Validation { .. } => {
                ErrorCategory::Validation
            }
            CoreError::NotFound { .. } => ErrorCategory::NotFound,
            CoreError::Conflict { .. } => ErrorCategory::Conflict,
            CoreError::Store(_) | CoreError::Credential(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Returns `true` for policy denials.
    #[inline]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, CoreError::AccessDenied)
    }

    /// Returns `true` if the referenced record was missing.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors reported by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given key.
    #[error("{resource} not found")]
    NotFound {
        /// Kind of record.
        resource: &'static str,
    },

    /// Compare-and-swap on `updated_at` failed.
    #[error("{resource} was modified concurrently")]
    VersionMismatch {
        /// Kind of record.
        resource: &'static str,
    },

    /// A uniqueness constraint was violated.
    #[error("duplicate {resource}: {key}")]
    Duplicate {
        /// Kind of record.
        resource: &'static str,
        /// Offending key.
        key: String,
    },

    /// Backend failure (I/O, connection, driver).
    #[error("backend error: {message}")]
    Backend {
        /// Backend message.
        message: String,
    },
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource } => CoreError::not_found(resource),
            StoreError::VersionMismatch { resource } => {
                CoreError::conflict(format!("{resource} was modified by another request"))
            }
            StoreError::Duplicate { resource, key } => {
                CoreError::conflict(format!("{resource} '{key}' already exists"))
            }
            other @ StoreError::Backend { .. } => CoreError::Store(other),
        }
    }
}
