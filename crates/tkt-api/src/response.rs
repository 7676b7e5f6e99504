// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use serde::{Deserialize, Serialize};
use tkt_core::{PublicProfile, TicketId, TicketState};

use crate::auth::IssuedSession;

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Body of a successful login or refresh.
///
/// The refresh token travels only in the `Set-Cookie` header.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// The authenticated subject, present on login.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<PublicProfile>,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: None,
        }
    }

    /// Builds the response for an issued session.
    pub fn from_session(session: &IssuedSession, expires_in: i64) -> Self {
        Self::new(session.access_token.clone(), expires_in)
    }

    /// Attaches the subject's public profile.
    pub fn with_user(mut self, user: PublicProfile) -> Self {
        self.user = Some(user);
        self
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tickets
// =============================================================================

/// States a caller may pick for a ticket.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionsResponse {
    /// Ticket the states belong to.
    pub ticket_id: TicketId,
    /// Current state.
    pub current: TicketState,
    /// The current state followed by every reachable state.
    pub transitions: Vec<TicketState>,
}

// =============================================================================
// Tests
// =============================================================================
