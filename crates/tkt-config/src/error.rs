// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for tkt-config.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid environment variable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Unsupported configuration format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The unsupported format.
        format: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Io { .. } | ConfigError::FileNotFound { .. }
        )
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::Io { .. } => "io",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
            ConfigError::Serialization { .. } => "serialization",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
