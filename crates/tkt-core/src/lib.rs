// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tkt-core
//!
//! Domain model, access policy and ticket lifecycle for the tkt ticket
//! tracking service.
//!
//! This crate has no HTTP or token knowledge. It provides:
//!
//! - **Types**: identifiers, [`Role`] and the verified [`Identity`]
//! - **Ticket**: the ticket model, partial updates and field tracking
//! - **Lifecycle**: the ticket state machine
//! - **Policy**: role-based decision functions
//! - **Store**: async storage capabilities plus in-memory implementations
//! - **Service**: ticket, comment and account services composing the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tkt_core::{Identity, NewTicket, Role, TicketService, UserId};
//! use tkt_core::store::{InMemoryCommentStore, InMemorySubjectStore, InMemoryTicketStore};
//!
//! let service = TicketService::new(
//!     Arc::new(InMemoryTicketStore::new()),
//!     Arc::new(InMemorySubjectStore::new()),
//!     Arc::new(InMemoryCommentStore::new()),
//! );
//! let me = Identity::new(UserId::new(), Role::User);
//! let ticket = service.create(&me, NewTicket::new("VPN down", "")).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Domain Modules
// =============================================================================

pub mod account;
pub mod comment;
pub mod credentials;
pub mod lifecycle;
pub mod policy;
pub mod ticket;

// =============================================================================
// Storage & Services
// =============================================================================

pub mod service;
pub mod store;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use account::{Account, PublicProfile, Signup};
pub use comment::{Comment, NewComment};
pub use credentials::{
    check_off_runtime, hash_off_runtime, CredentialVerifier, SharedCredentialVerifier,
};
pub use error::{CoreError, CoreResult, ErrorCategory, StoreError};
pub use policy::{ListScope, TicketAction};
pub use service::{CommentService, TicketService, UserService};
pub use store::{CommentStore, Page, SubjectStore, TicketStore};
pub use ticket::{NewTicket, Ticket, TicketField, TicketPatch, TicketPriority, TicketState};
pub use types::{CommentId, Identity, Role, TicketId, UserId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
