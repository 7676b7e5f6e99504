// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use tkt_config::TktConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime;

/// Secrets shorter than this draw a warning.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Validates the configuration file and prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = cli.config_path().ok_or_else(|| {
        BinError::config("No configuration file given and ./tkt.yaml does not exist")
    })?;

    let config = runtime::load(&config_path)?;
    // The API layer rejects what the file schema lets through, e.g. a bad CORS origin set.
    runtime::build_api_config(&config)?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}:{}", config.server.host, config.server.port);
            println!("  Base path: {}", config.server.base_path);
            println!("  Issuer: {}", config.auth.issuer);
            println!(
                "  Token TTLs: access {}s, refresh {}s",
                config.auth.access_token_ttl_secs, config.auth.refresh_token_ttl_secs
            );
            println!("  Cookie: {} (domain {})", config.cookie.name, config.cookie.domain);
            println!("  Seed accounts: {}", config.seed.users.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", render_json(&redacted(&config))?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "host": config.server.host,
                    "port": config.server.port,
                    "base_path": config.server.base_path,
                    "issuer": config.auth.issuer,
                    "seed_accounts": config.seed.users.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(redacted(&config)) } else { None },
            });
            println!("{}", render_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns non-fatal findings about a valid configuration.
pub fn collect_warnings(config: &TktConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.auth.jwt_secret.expose().len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "auth.jwt_secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }
    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin; the refresh cookie cannot be sent cross-origin".into());
    }
    if !config.seed.users.iter().any(|u| u.role.eq_ignore_ascii_case("admin")) {
        warnings.push("No admin seed account; nobody can manage roles on a fresh store".into());
    }
    if !config.server.conceal_forbidden_tickets {
        warnings.push("Forbidden tickets answer 403, revealing that they exist".into());
    }

    warnings
}

fn redacted(config: &TktConfig) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or_default();
    if let Some(secret) = value.pointer_mut("/auth/jwt_secret") {
        *secret = "***".into();
    }
    if let Some(users) = value.pointer_mut("/seed/users").and_then(|u| u.as_array_mut()) {
        for user in users {
            if let Some(password) = user.get_mut("password") {
                *password = "***".into();
            }
        }
    }
    value
}

fn render_json(value: &serde_json::Value) -> BinResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| BinError::runtime(e.to_string()))
}
