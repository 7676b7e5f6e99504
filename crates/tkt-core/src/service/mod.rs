// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application services.
//!
//! Each service composes the stores with the access policy and, for
//! tickets, the lifecycle. Services are cheap to clone and hold only
//! shared handles.

pub mod comment;
pub mod ticket;
pub mod user;

pub use comment::CommentService;
pub use ticket::TicketService;
pub use user::UserService;
