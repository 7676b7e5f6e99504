// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CommentId, TicketId, UserId};

/// A comment posted on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Ticket the comment belongs to.
    pub ticket_id: TicketId,
    /// Author.
    pub created_by: UserId,
    /// Comment body.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(ticket_id: TicketId, created_by: UserId, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CommentId::new(),
            ticket_id,
            created_by,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for posting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    /// Target ticket.
    pub ticket_id: TicketId,
    /// Comment body.
    pub description: String,
}

impl NewComment {
    /// Validates the request.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("description must not be empty"));
        }
        Ok(())
    }
}
