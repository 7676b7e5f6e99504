// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementations.
//!
//! Backed by `HashMap`s behind `parking_lot::RwLock`. No lock is ever held
//! across an `.await`, so the async trait methods complete synchronously.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{CommentStore, Page, SubjectStore, TicketStore};
use crate::account::{normalize_email, Account};
use crate::comment::Comment;
use crate::error::StoreError;
use crate::ticket::Ticket;
use crate::types::{CommentId, TicketId, UserId};

// =============================================================================
// InMemorySubjectStore
// =============================================================================

#[derive(Default)]
struct Accounts {
    by_id: HashMap<UserId, Account>,
    by_email: HashMap<String, UserId>,
}

/// Account store held in process memory.
#[derive(Default)]
pub struct InMemorySubjectStore {
    inner: RwLock<Accounts>,
}

impl InMemorySubjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Returns `true` if no account is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn get_by_id(&self, id: &UserId) -> Result<Account, StoreError> {
        self.inner
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { resource: "account" })
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, StoreError> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or(StoreError::NotFound { resource: "account" })
    }

    async fn create(&self, mut account: Account) -> Result<Account, StoreError> {
        account.email = normalize_email(&account.email);
        let mut inner = self.inner.write();
        if inner.by_email.contains_key(&account.email) {
            return Err(StoreError::Duplicate {
                resource: "account",
                key: account.email,
            });
        }
        inner.by_email.insert(account.email.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, mut account: Account) -> Result<Account, StoreError> {
        account.email = normalize_email(&account.email);
        let mut inner = self.inner.write();
        let previous_email = match inner.by_id.get(&account.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound { resource: "account" }),
        };
        if previous_email != account.email {
            if inner.by_email.contains_key(&account.email) {
                return Err(StoreError::Duplicate {
                    resource: "account",
                    key: account.email,
                });
            }
            inner.by_email.remove(&previous_email);
            inner.by_email.insert(account.email.clone(), account.id);
        }
        inner.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let account = inner
            .by_id
            .remove(id)
            .ok_or(StoreError::NotFound { resource: "account" })?;
        inner.by_email.remove(&account.email);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.inner.read().by_id.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }
}

// =============================================================================
// InMemoryTicketStore
// =============================================================================

/// Ticket store held in process memory.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<TicketId, Ticket>>,
}

impl InMemoryTicketStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tickets.
    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    /// Returns `true` if no ticket is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect(&self, page: Page, filter: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .read()
            .values()
            .filter(|t| filter(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        page.slice(tickets)
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write();
        if tickets.contains_key(&ticket.id) {
            return Err(StoreError::Duplicate {
                resource: "ticket",
                key: ticket.id.to_string(),
            });
        }
        tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, id: &TicketId) -> Result<Ticket, StoreError> {
        self.tickets
            .read()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { resource: "ticket" })
    }

    async fn update(
        &self,
        ticket: Ticket,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write();
        let stored = tickets
            .get_mut(&ticket.id)
            .ok_or(StoreError::NotFound { resource: "ticket" })?;
        if stored.updated_at != expected_updated_at {
            return Err(StoreError::VersionMismatch { resource: "ticket" });
        }
        *stored = ticket.clone();
        Ok(ticket)
    }

    async fn delete(&self, id: &TicketId) -> Result<(), StoreError> {
        self.tickets
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { resource: "ticket" })
    }

    async fn list_all(&self, page: Page) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.collect(page, |_| true))
    }

    async fn list_by_creator(&self, creator: &UserId, page: Page) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.collect(page, |t| t.is_creator(creator)))
    }

    async fn list_by_assignee(
        &self,
        assignee: &UserId,
        page: Page,
    ) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.collect(page, |t| t.is_assignee(assignee)))
    }
}

// =============================================================================
// InMemoryCommentStore
// =============================================================================

/// Comment store held in process memory.
#[derive(Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryCommentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn create(&self, comment: Comment) -> Result<Comment, StoreError> {
        self.comments.write().insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get(&self, id: &CommentId) -> Result<Comment, StoreError> {
        self.comments
            .read()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { resource: "comment" })
    }

    async fn list_by_ticket(&self, ticket_id: &TicketId) -> Result<Vec<Comment>, StoreError> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .values()
            .filter(|c| &c.ticket_id == ticket_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn delete_by_ticket(&self, ticket_id: &TicketId) -> Result<usize, StoreError> {
        let mut comments = self.comments.write();
        let before = comments.len();
        comments.retain(|_, c| &c.ticket_id != ticket_id);
        Ok(before - comments.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
