// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the tkt binary.
//!
//! Exit codes group failures by what the operator has to fix:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1 | configuration (file, overrides, seed roles) |
//! | 2 | process setup (logging, signal handlers) |
//! | 3 | serving or command execution |
//! | 4 | I/O |
//! | 5 | seed account provisioning |
//! | 6 | API server construction |
//! | 7 | ticket/account domain failure |
//! | 8 | unusable password input |

use thiserror::Error;

/// Result type alias for tkt-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the tkt binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Process setup failed before serving.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Failure while serving or running a command.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// A seed entry names a role that cannot be granted.
    #[error("Seed account {email} has unknown role '{role}' (expected user, agent or admin)")]
    UnknownSeedRole {
        /// Email of the seed entry.
        email: String,
        /// Role as written in the configuration.
        role: String,
    },

    /// Provisioning a seed account failed.
    #[error("Failed to seed account {email}")]
    Seed {
        /// Email of the seed entry.
        email: String,
        /// Why provisioning failed.
        #[source]
        source: tkt_core::CoreError,
    },

    /// The password given to `hash-password` cannot be hashed.
    #[error("Password input rejected: {0}")]
    PasswordInput(String),

    /// API server construction failed.
    #[error("API error: {0}")]
    Api(#[from] tkt_api::ApiError),

    /// Loading or validating the configuration failed.
    #[error("Config error: {0}")]
    Config(#[from] tkt_config::ConfigError),

    /// Domain operation failed outside seeding.
    #[error("Core error: {0}")]
    Core(#[from] tkt_core::CoreError),

    /// Error wrapped with what the binary was doing.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a seeding error for `email`.
    pub fn seed(email: impl Into<String>, source: tkt_core::CoreError) -> Self {
        Self::Seed {
            email: email.into(),
            source,
        }
    }

    /// Creates a password input error.
    pub fn password_input(msg: impl Into<String>) -> Self {
        Self::PasswordInput(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) | Self::UnknownSeedRole { .. } => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Seed { .. } => 5,
            Self::Api(_) => 6,
            Self::Core(_) => 7,
            Self::PasswordInput(_) => 8,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_with_context() {
        let err = BinError::config("inner error").with_context("outer context");
        assert_eq!(err.to_string(), "outer context: Configuration error: inner error");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::config("test").exit_code(), 1);
        assert_eq!(BinError::init("test").exit_code(), 2);
        assert_eq!(BinError::runtime("test").exit_code(), 3);
        assert_eq!(BinError::io("test").exit_code(), 4);
        assert_eq!(
            BinError::seed("a@example.com", tkt_core::CoreError::AccessDenied).exit_code(),
            5
        );
        assert_eq!(BinError::password_input("empty").exit_code(), 8);
        assert_eq!(
            BinError::from(tkt_config::ConfigError::file_not_found("tkt.yaml")).exit_code(),
            1
        );
        assert_eq!(BinError::from(tkt_core::CoreError::not_found("ticket")).exit_code(), 7);
    }

    #[test]
    fn test_unknown_seed_role_is_configuration() {
        let err = BinError::UnknownSeedRole {
            email: "root@example.com".into(),
            role: "superuser".into(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("root@example.com"));
        assert!(err.to_string().contains("'superuser'"));
    }

    #[test]
    fn test_seed_error_keeps_core_cause() {
        let err = BinError::seed("ops@example.com", tkt_core::CoreError::validation("bad email"));
        assert_eq!(err.to_string(), "Failed to seed account ops@example.com");
        let cause = err.source().map(|c| c.to_string()).unwrap_or_default();
        assert!(cause.contains("bad email"));
    }

    #[test]
    fn test_anyhow_keeps_context() {
        use anyhow::Context;
        let result: anyhow::Result<()> =
            Err(std::io::Error::other("closed")).context("reading stdin");
        let err = BinError::from(result.unwrap_err());
        assert_eq!(err.to_string(), "Runtime error: reading stdin: closed");
    }
}
