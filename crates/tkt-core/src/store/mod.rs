// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Storage capabilities consumed by the services.
//!
//! Each trait is a narrow async capability. Services hold them as
//! `Arc<dyn ...>` so any backend can be injected at startup; the
//! [`memory`] module provides the in-process implementation used by the
//! default deployment and by tests.
//!
//! # Concurrency
//!
//! [`TicketStore::update`] is a compare-and-swap on `updated_at`: the write
//! only lands if the stored ticket still carries the timestamp the caller
//! loaded, otherwise it fails with [`StoreError::VersionMismatch`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::comment::Comment;
use crate::error::StoreError;
use crate::ticket::Ticket;
use crate::types::{CommentId, TicketId, UserId};

pub mod memory;

pub use memory::{InMemoryCommentStore, InMemorySubjectStore, InMemoryTicketStore};

// =============================================================================
// Page
// =============================================================================

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of records.
    pub limit: usize,
    /// Records to skip.
    pub offset: usize,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 50;

    /// Largest page a caller may request.
    pub const MAX_LIMIT: usize = 500;

    /// Creates a page, clamping `limit` to `1..=MAX_LIMIT`.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset,
        }
    }

    /// Applies the window to an already ordered iterator.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

// =============================================================================
// Store traits
// =============================================================================

/// Account lookup and management.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Fetches an account by identifier.
    async fn get_by_id(&self, id: &UserId) -> Result<Account, StoreError>;

    /// Fetches an account by email (case-insensitive).
    async fn get_by_email(&self, email: &str) -> Result<Account, StoreError>;

    /// Inserts a new account. Fails with `Duplicate` if the email is taken.
    async fn create(&self, account: Account) -> Result<Account, StoreError>;

    /// Replaces an existing account.
    async fn update(&self, account: Account) -> Result<Account, StoreError>;

    /// Removes an account.
    async fn delete(&self, id: &UserId) -> Result<(), StoreError>;

    /// Lists every account, oldest first.
    async fn list(&self) -> Result<Vec<Account>, StoreError>;
}

/// Ticket persistence.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Inserts a new ticket.
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError>;

    /// Fetches a ticket.
    async fn get(&self, id: &TicketId) -> Result<Ticket, StoreError>;

    /// Replaces a ticket if its stored `updated_at` equals `expected_updated_at`.
    async fn update(
        &self,
        ticket: Ticket,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError>;

    /// Removes a ticket.
    async fn delete(&self, id: &TicketId) -> Result<(), StoreError>;

    /// Lists all tickets, newest first.
    async fn list_all(&self, page: Page) -> Result<Vec<Ticket>, StoreError>;

    /// Lists tickets opened by `creator`, newest first.
    async fn list_by_creator(&self, creator: &UserId, page: Page) -> Result<Vec<Ticket>, StoreError>;

    /// Lists tickets assigned to `assignee`, newest first.
    async fn list_by_assignee(
        &self,
        assignee: &UserId,
        page: Page,
    ) -> Result<Vec<Ticket>, StoreError>;
}

/// Comment persistence.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Inserts a new comment.
    async fn create(&self, comment: Comment) -> Result<Comment, StoreError>;

    /// Fetches a comment.
    async fn get(&self, id: &CommentId) -> Result<Comment, StoreError>;

    /// Lists the comments of a ticket, oldest first.
    async fn list_by_ticket(&self, ticket_id: &TicketId) -> Result<Vec<Comment>, StoreError>;

    /// Removes every comment of a ticket, returning how many were removed.
    async fn delete_by_ticket(&self, ticket_id: &TicketId) -> Result<usize, StoreError>;
}

/// Shared subject store handle.
pub type SharedSubjectStore = Arc<dyn SubjectStore>;

/// Shared ticket store handle.
pub type SharedTicketStore = Arc<dyn TicketStore>;

/// Shared comment store handle.
pub type SharedCommentStore = Arc<dyn CommentStore>;
