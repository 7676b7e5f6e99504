// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Stand-ins for the credential verifier and the stores, with error
//! injection and call counting.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tkt_core::store::{InMemoryTicketStore, TicketStore};
use tkt_core::{CoreError, CredentialVerifier, Page, StoreError, Ticket, TicketId, UserId};

// =============================================================================
// PlainVerifier
// =============================================================================

/// Credential verifier that stores passwords with a fixed prefix.
///
/// Argon2 is far too slow for debug-build test suites that log in dozens
/// of times. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainVerifier;

impl PlainVerifier {
    const PREFIX: &'static str = "plain$";

    /// Returns a shared handle.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl CredentialVerifier for PlainVerifier {
    fn hash(&self, password: &str) -> Result<String, CoreError> {
        Ok(format!("{}{}", Self::PREFIX, password))
    }

    fn check(&self, hash: &str, candidate: &str) -> bool {
        hash.strip_prefix(Self::PREFIX) == Some(candidate)
    }
}

// =============================================================================
// FlakyTicketStore
// =============================================================================

/// Ticket store wrapper with injectable failures.
///
/// Reads and writes go to an [`InMemoryTicketStore`] unless a failure is
/// armed. `fail_next_update_with_conflict` simulates a concurrent writer
/// slipping in between the orchestrator's read and its compare-and-swap.
#[derive(Default)]
pub struct FlakyTicketStore {
    inner: InMemoryTicketStore,
    conflict_next_update: AtomicBool,
    backend_down: AtomicBool,
    update_count: AtomicU64,
}

impl FlakyTicketStore {
    /// Creates a healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next update fail with a version mismatch.
    pub fn fail_next_update_with_conflict(&self) {
        self.conflict_next_update.store(true, Ordering::SeqCst);
    }

    /// Makes every call fail with a backend error until cleared.
    pub fn set_backend_down(&self, down: bool) {
        self.backend_down.store(down, Ordering::SeqCst);
    }

    /// Number of update attempts that reached the store.
    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::SeqCst)
    }

    fn check_backend(&self) -> Result<(), StoreError> {
        if self.backend_down.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for FlakyTicketStore {
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        self.check_backend()?;
        self.inner.create(ticket).await
    }

    async fn get(&self, id: &TicketId) -> Result<Ticket, StoreError> {
        self.check_backend()?;
        self.inner.get(id).await
    }

    async fn update(
        &self,
        ticket: Ticket,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.check_backend()?;
        if self.conflict_next_update.swap(false, Ordering::SeqCst) {
            return Err(StoreError::VersionMismatch { resource: "ticket" });
        }
        self.inner.update(ticket, expected_updated_at).await
    }

    async fn delete(&self, id: &TicketId) -> Result<(), StoreError> {
        self.check_backend()?;
        self.inner.delete(id).await
    }

    async fn list_all(&self, page: Page) -> Result<Vec<Ticket>, StoreError> {
        self.check_backend()?;
        self.inner.list_all(page).await
    }

    async fn list_by_creator(&self, creator: &UserId, page: Page) -> Result<Vec<Ticket>, StoreError> {
        self.check_backend()?;
        self.inner.list_by_creator(creator, page).await
    }

    async fn list_by_assignee(
        &self,
        assignee: &UserId,
        page: Page,
    ) -> Result<Vec<Ticket>, StoreError> {
        self.check_backend()?;
        self.inner.list_by_assignee(assignee, page).await
    }
}
