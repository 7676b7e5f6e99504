// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! - `fixtures`: seeded accounts, signing config, config documents
//! - `builders`: ticket and HTTP request builders
//! - `assertions`: response assertions
//! - `mocks`: fast credential verifier, failure-injecting ticket store
//! - `harness`: the in-process application

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use harness::*;
pub use mocks::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test module.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,tkt_core=debug,tkt_api=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Generates an email no other test uses.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}
