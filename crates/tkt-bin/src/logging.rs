// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Directives appended to every filter to quiet the HTTP stack.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,tower=warn,tower_http=info,axum=info";

/// Resolved logging options.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Level directive, e.g. `info` or `tkt_api=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Include span targets.
    pub with_target: bool,
    /// Include file and line.
    pub with_file: bool,
    /// Include thread IDs.
    pub with_thread_ids: bool,
}

impl LogSettings {
    /// Settings with the given level and format and default decorations.
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
            with_target: true,
            with_file: false,
            with_thread_ids: false,
        }
    }

    /// Applies the decoration switches from the config file.
    pub fn with_decorations(mut self, config: &tkt_config::LoggingConfig) -> Self {
        self.with_target = config.with_target;
        self.with_file = config.with_file;
        self.with_thread_ids = config.with_thread_ids;
        self
    }
}

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this
/// twice is an error.
pub fn init_logging(settings: &LogSettings) -> BinResult<()> {
    let env_filter = build_filter(&settings.level)?;

    let result = match settings.format {
        LogFormat::Text => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(settings.with_target)
                        .with_thread_ids(settings.with_thread_ids)
                        .with_file(settings.with_file)
                        .with_line_number(settings.with_file)
                        .with_ansi(is_terminal),
                )
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(settings.with_thread_ids)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Compact => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(is_terminal),
                )
                .try_init()
        }
    };

    result.map_err(|e| BinError::init(format!("Failed to initialize logging: {}", e)))
}

/// Builds the filter from `RUST_LOG` or `level`, plus dependency directives.
fn build_filter(level: &str) -> BinResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(format!("{},{}", level, DEPENDENCY_DIRECTIVES))
        .map_err(|e| BinError::config(format!("Invalid log level '{}': {}", level, e)))
}

// =============================================================================
// Log Level Parsing
// =============================================================================

/// Parses a log level string into a `Level`, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_settings_decorations() {
        let mut config = tkt_config::LoggingConfig::default();
        config.with_file = true;
        config.with_thread_ids = true;

        let settings = LogSettings::new("debug", LogFormat::Json).with_decorations(&config);
        assert!(settings.with_file);
        assert!(settings.with_thread_ids);
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_build_filter_accepts_module_directives() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("tkt_api=debug").is_ok());
    }
}
