// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket data model.
//!
//! A [`Ticket`] is the unit of work tracked by the service. Authorization
//! decisions read only `created_by`, `assigned_to` and `state`; the other
//! fields are carried along for presentation.
//!
//! Updates arrive as a [`TicketPatch`] (all fields optional), which is split
//! into the set of changed [`TicketField`]s plus a proposed ticket so the
//! policy can be evaluated per field before anything is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CoreError;
use crate::types::{TicketId, UserId};

// =============================================================================
// TicketState
// =============================================================================

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TicketState {
    /// Newly opened, not yet picked up.
    Open,
    /// Assigned and waiting on work.
    Pending,
    /// Fixed, awaiting confirmation.
    Resolved,
    /// Done. Terminal.
    Closed,
    /// Abandoned. Terminal.
    Cancelled,
}

impl TicketState {
    /// All states, in lifecycle order.
    pub const ALL: [TicketState; 5] = [
        TicketState::Open,
        TicketState::Pending,
        TicketState::Resolved,
        TicketState::Closed,
        TicketState::Cancelled,
    ];

    /// Returns the canonical state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Open => "open",
            TicketState::Pending => "pending",
            TicketState::Resolved => "resolved",
            TicketState::Closed => "closed",
            TicketState::Cancelled => "cancelled",
        }
    }

    /// Parses a state name case-insensitively.
    ///
    /// `cancel` and `canceled` are accepted as aliases for `cancelled`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(TicketState::Open),
            "pending" => Some(TicketState::Pending),
            "resolved" => Some(TicketState::Resolved),
            "closed" => Some(TicketState::Closed),
            "cancelled" | "canceled" | "cancel" => Some(TicketState::Cancelled),
            _ => None,
        }
    }
}

impl TryFrom<String> for TicketState {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown ticket state '{value}'"))
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// TicketPriority
// =============================================================================

/// Priority of a ticket. Lower rank means more urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TicketPriority {
    /// Drop everything.
    Critical = 1,
    /// Next in line.
    High = 2,
    /// Normal.
    Medium = 3,
    /// Default for new tickets.
    #[default]
    Low = 4,
}

impl TicketPriority {
    /// Returns the canonical priority name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Critical => "critical",
            TicketPriority::High => "high",
            TicketPriority::Medium => "medium",
            TicketPriority::Low => "low",
        }
    }

    /// Parses a priority name case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(TicketPriority::Critical),
            "high" => Some(TicketPriority::High),
            "medium" => Some(TicketPriority::Medium),
            "low" => Some(TicketPriority::Low),
            _ => None,
        }
    }

    /// Returns the numeric rank (1 = critical, 4 = low).
    #[inline]
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<String> for TicketPriority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown ticket priority '{value}'"))
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A tracked ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Account that opened the ticket.
    pub created_by: UserId,
    /// Agents working the ticket.
    pub assigned_to: BTreeSet<UserId>,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Current lifecycle state.
    pub state: TicketState,
    /// Current priority.
    pub priority: TicketPriority,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp. Also serves as the concurrency token.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a new ticket in its initial shape: `Open`, `Low`, unassigned.
    pub fn open(created_by: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TicketId::new(),
            created_by,
            assigned_to: BTreeSet::new(),
            title: title.into(),
            description: description.into(),
            state: TicketState::Open,
            priority: TicketPriority::Low,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the given account opened this ticket.
    #[inline]
    pub fn is_creator(&self, user: &UserId) -> bool {
        &self.created_by == user
    }

    /// Returns `true` if the given account is assigned to this ticket.
    #[inline]
    pub fn is_assignee(&self, user: &UserId) -> bool {
        self.assigned_to.contains(user)
    }

    /// Returns `true` if no one is assigned yet.
    #[inline]
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to.is_empty()
    }
}

// =============================================================================
// NewTicket
// =============================================================================

/// Input for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    /// Short summary.
    pub title: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
}

impl NewTicket {
    /// Creates a new ticket request.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Validates the request.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title must not be empty"));
        }
        Ok(())
    }
}

// =============================================================================
// TicketField / TicketPatch
// =============================================================================

/// A ticket field that an update may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketField {
    /// `title`
    Title,
    /// `description`
    Description,
    /// `state`
    State,
    /// `priority`
    Priority,
    /// `assigned_to`
    AssignedTo,
}

impl TicketField {
    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketField::Title => "title",
            TicketField::Description => "description",
            TicketField::State => "state",
            TicketField::Priority => "priority",
            TicketField::AssignedTo => "assigned_to",
        }
    }
}

impl fmt::Display for TicketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A partial ticket update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TicketState>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    /// Replacement assignee set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<BTreeSet<UserId>>,
}

impl TicketPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the state.
    pub fn with_state(mut self, state: TicketState) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the assignee set.
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assigned_to = Some(assignees.into_iter().collect());
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Returns the fields this patch sets.
    pub fn changed_fields(&self) -> BTreeSet<TicketField> {
        let mut fields = BTreeSet::new();
        if self.title.is_some() {
            fields.insert(TicketField::Title);
        }
        if self.description.is_some() {
            fields.insert(TicketField::Description);
        }
        if self.state.is_some() {
            fields.insert(TicketField::State);
        }
        if self.priority.is_some() {
            fields.insert(TicketField::Priority);
        }
        if self.assigned_to.is_some() {
            fields.insert(TicketField::AssignedTo);
        }
        fields
    }

    /// Builds the proposed ticket by overlaying this patch on `current`.
    pub fn apply_to(&self, current: &Ticket) -> Ticket {
        let mut proposed = current.clone();
        if let Some(title) = &self.title {
            proposed.title = title.clone();
        }
        if let Some(description) = &self.description {
            proposed.description = description.clone();
        }
        if let Some(state) = self.state {
            proposed.state = state;
        }
        if let Some(priority) = self.priority {
            proposed.priority = priority;
        }
        if let Some(assigned_to) = &self.assigned_to {
            proposed.assigned_to = assigned_to.clone();
        }
        proposed
    }
}

// =============================================================================
// Tests
// =============================================================================
