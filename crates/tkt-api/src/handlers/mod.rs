// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - `health`: liveness
//! - `auth`: login, refresh, logout, signup and the caller's profile
//! - `tickets`: ticket queries and mutations
//! - `comments`: ticket comments
//! - `users`: user directory and admin account management

mod auth;
mod comments;
mod health;
mod tickets;
mod users;

pub use auth::*;
pub use comments::*;
pub use health::*;
pub use tickets::*;
pub use users::*;
