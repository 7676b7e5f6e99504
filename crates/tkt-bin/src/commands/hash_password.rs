// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use anyhow::Context;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints the argon2id PHC string for a password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match args.password {
        Some(password) if !args.stdin => password,
        _ => read_stdin_line()?,
    };

    println!("{}", hash(&password)?);
    Ok(())
}

fn hash(password: &str) -> BinResult<String> {
    if password.is_empty() {
        return Err(BinError::password_input("password must not be empty"));
    }
    Ok(tkt_api::auth::hash_password(password)?)
}

fn read_stdin_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tkt_api::auth::Argon2Verifier;
    use tkt_core::CredentialVerifier;

    #[test]
    fn test_hash_verifies() {
        let phc = hash("correct horse").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(Argon2Verifier::new().check(&phc, "correct horse"));
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = hash("").unwrap_err();
        assert!(matches!(err, BinError::PasswordInput(_)));
        assert_eq!(err.exit_code(), 8);
    }
}
