// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use tkt_core::store::{
    InMemoryCommentStore, InMemorySubjectStore, InMemoryTicketStore, SharedCommentStore,
    SharedSubjectStore, SharedTicketStore,
};
use tkt_core::{CommentService, SharedCredentialVerifier, TicketService, UserService};

use crate::auth::{Argon2Verifier, CookiePolicy, SessionManager, TokenCodec};
use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Every collaborator is injected here at startup; handlers reach them
/// through Axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Login, refresh and logout.
    pub sessions: Arc<SessionManager>,
    /// Ticket queries and the mutation orchestrator.
    pub tickets: TicketService,
    /// Ticket comments.
    pub comments: CommentService,
    /// Accounts and role management.
    pub users: UserService,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        self.sessions.codec()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
///
/// Stores default to the in-memory implementations and the credential
/// verifier defaults to argon2.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    subjects: Option<SharedSubjectStore>,
    tickets: Option<SharedTicketStore>,
    comments: Option<SharedCommentStore>,
    credentials: Option<SharedCredentialVerifier>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the account store.
    pub fn subject_store(mut self, store: SharedSubjectStore) -> Self {
        self.subjects = Some(store);
        self
    }

    /// Sets the ticket store.
    pub fn ticket_store(mut self, store: SharedTicketStore) -> Self {
        self.tickets = Some(store);
        self
    }

    /// Sets the comment store.
    pub fn comment_store(mut self, store: SharedCommentStore) -> Self {
        self.comments = Some(store);
        self
    }

    /// Sets the credential verifier.
    pub fn credentials(mut self, verifier: SharedCredentialVerifier) -> Self {
        self.credentials = Some(verifier);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the JWT configuration cannot produce a token codec.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let subjects: SharedSubjectStore = self
            .subjects
            .unwrap_or_else(|| Arc::new(InMemorySubjectStore::new()));
        let tickets: SharedTicketStore = self
            .tickets
            .unwrap_or_else(|| Arc::new(InMemoryTicketStore::new()));
        let comments: SharedCommentStore = self
            .comments
            .unwrap_or_else(|| Arc::new(InMemoryCommentStore::new()));
        let credentials: SharedCredentialVerifier = self
            .credentials
            .unwrap_or_else(|| Arc::new(Argon2Verifier::new()));

        let codec = TokenCodec::new(config.jwt.clone())?;
        let cookies = CookiePolicy::new(config.cookie.clone(), codec.refresh_ttl_secs());
        let sessions = SessionManager::new(codec, subjects.clone(), credentials.clone(), cookies);

        Ok(AppState {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            tickets: TicketService::new(tickets.clone(), subjects.clone(), comments.clone()),
            comments: CommentService::new(comments, tickets),
            users: UserService::new(subjects, credentials),
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
