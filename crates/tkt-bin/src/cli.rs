// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the API server (default)
//! - `validate`: Validate the configuration file
//! - `hash-password`: Print an argon2id hash for a password
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tkt_config::LoggingConfig;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tkt.yaml";

// =============================================================================
// Main CLI Structure
// =============================================================================

/// tkt - ticket tracking service
///
/// Serves the ticket API with JWT sessions, role-based access control and
/// a ticket lifecycle state machine.
#[derive(Parser, Debug)]
#[command(
    name = "tkt",
    author = "Sylvex <contact@sylvex.io>",
    version = tkt_core::VERSION,
    about = "Ticket tracking service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (defaults to ./tkt.yaml when present)
    #[arg(short, long, env = "TKT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TKT_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact)
    #[arg(long, env = "TKT_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the tkt CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Hash a password with argon2id
    ///
    /// Prints a PHC string suitable for storing as an account password hash.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the configured port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip provisioning seed accounts
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets redacted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<tkt_config::LogFormat> for LogFormat {
    fn from(format: tkt_config::LogFormat) -> Self {
        match format {
            tkt_config::LogFormat::Text => LogFormat::Text,
            tkt_config::LogFormat::Compact => LogFormat::Compact,
            tkt_config::LogFormat::Json => LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Returns the config file to load, if any.
    ///
    /// An explicit `--config` always wins. Otherwise `./tkt.yaml` is used
    /// when it exists, and `None` means defaults plus environment.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            }
        }
    }

    /// Get the effective log level. Flags beat `--log-level`, which beats
    /// the config file.
    pub fn effective_log_level(&self, config: &LoggingConfig) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| config.level.as_str().to_string())
        }
    }

    /// Get the effective log format.
    pub fn effective_log_format(&self, config: &LoggingConfig) -> LogFormat {
        self.log_format.unwrap_or_else(|| config.format.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
