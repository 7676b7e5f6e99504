// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! tkt - ticket tracking service

use tkt_bin::error::report_error_and_exit;
use tkt_bin::{commands, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
