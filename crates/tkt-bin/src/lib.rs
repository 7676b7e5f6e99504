// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tkt-bin
//!
//! CLI binary for the tkt ticket service.
//!
//! - CLI argument parsing with clap
//! - Server runtime and seed accounts
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! tkt
//!
//! # Start with a config file
//! tkt -c /etc/tkt/tkt.yaml
//!
//! # Validate configuration
//! tkt validate --strict
//!
//! # Hash a password
//! tkt hash-password 'correct horse'
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::{init_logging, LogSettings};
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
