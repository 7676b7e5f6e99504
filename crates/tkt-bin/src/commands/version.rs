// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints component versions and build information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("tkt - ticket tracking service");
    println!();
    println!("Version Information:");
    println!("  tkt-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  tkt-core:   {}", tkt_core::VERSION);
    println!("  tkt-api:    {}", tkt_api::VERSION);
    println!("  tkt-config: {}", tkt_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:     {}", std::env::consts::ARCH);
    println!("  OS:         {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
