// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every handler returns [`ApiResult`]. Errors from the core services and
//! the session protocol convert into [`ApiError`], which renders as
//!
//! ```json
//! { "error": { "code": "TOKEN_EXPIRED", "message": "...", "details": null } }
//! ```
//!
//! Server errors are logged at `error`, client errors at `debug`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use tkt_core::{CoreError, TicketState};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or session failure (401, or 403 for non-admins).
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Validation error (400).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Disallowed ticket state change (400).
    #[error("cannot transition ticket from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: TicketState,
        /// Requested state.
        to: TicketState,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Auth(e) if e.is_server_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => e.code(),
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Forbidden { .. } => "ACCESS_DENIED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// This message is safe to show to end users and does not expose
    /// internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth(e) if e.is_server_error() => "Authentication is temporarily unavailable".to_string(),
            ApiError::Auth(e) => e.to_string(),
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Forbidden { message } => message.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::InvalidTransition { .. } => self.to_string(),
            ApiError::Conflict { message } => message.clone(),
            ApiError::Internal { .. } => "An internal server error occurred".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Renders access denials as not-found.
    ///
    /// Used on ticket routes so callers cannot learn which ticket IDs exist.
    pub fn conceal_forbidden(self, resource: &str) -> Self {
        match self {
            ApiError::Forbidden { .. } => ApiError::not_found(resource),
            other => other,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.user_message();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.error_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            ApiError::InvalidTransition { from, to } => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an ApiError if there are errors.
    pub fn into_result<T>(self, success: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(ApiError::validation_with_errors("Validation failed", self))
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AccessDenied => ApiError::forbidden(err.to_string()),
            CoreError::InvalidTransition { from, to } => ApiError::InvalidTransition { from, to },
            CoreError::Validation { message } => ApiError::validation(message),
            CoreError::NotFound { resource } => ApiError::not_found(resource),
            CoreError::Conflict { message } => ApiError::conflict(message),
            CoreError::Store(_) | CoreError::Credential(_) => ApiError::internal(err.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::not_found("ticket").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("invalid").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::forbidden("no access").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("stale").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let expired = ApiError::from(AuthError::ExpiredToken);
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.error_code(), "TOKEN_EXPIRED");

        assert_eq!(
            ApiError::from(AuthError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::Signing("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).user_message(),
            "invalid email or password"
        );
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(
            ApiError::from(CoreError::AccessDenied).status_code(),
            StatusCode::FORBIDDEN
        );
        let transition = ApiError::from(CoreError::InvalidTransition {
            from: TicketState::Closed,
            to: TicketState::Open,
        });
        assert_eq!(transition.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(transition.error_code(), "INVALID_STATUS_TRANSITION");
        assert_eq!(
            ApiError::from(CoreError::conflict("stale")).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_conceal_forbidden() {
        let err = ApiError::from(CoreError::AccessDenied).conceal_forbidden("ticket");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::validation("x").conceal_forbidden("ticket");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        errors.add("email", "must not be empty");
        let err = errors.into_result(()).unwrap_err();
        assert!(err.error_details().is_some());
    }
}
