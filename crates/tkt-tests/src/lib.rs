// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tkt Integration Tests
//!
//! Shared fixtures and the in-process harness used by the suites in
//! `tests/`.
//!
//! ```bash
//! cargo test -p tkt-tests --test integration_core
//! cargo test -p tkt-tests --test integration_api
//! cargo test -p tkt-tests --test integration_config
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use tkt_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new().await;
//!     let ticket = app.open_ticket(&app.cast.alice, "Broken VPN").await;
//!     let response = app.get(&format!("/ticket/{}", ticket.id), &app.cast.bob).await;
//!     assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, unique_email};
    pub use axum::http::{Method, StatusCode};
    pub use serde_json::json;
}
