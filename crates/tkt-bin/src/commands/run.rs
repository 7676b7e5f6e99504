// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::{init_logging, LogSettings};
use crate::runtime::RuntimeBuilder;

/// Loads configuration, initializes logging and serves until shutdown.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(cli.config_path())
        .port(args.port)
        .seed(!args.no_seed)
        .build()?;

    let logging = &runtime.config().logging;
    let settings = LogSettings::new(cli.effective_log_level(logging), cli.effective_log_format(logging))
        .with_decorations(logging);
    init_logging(&settings)?;

    info!(
        port = runtime.config().server.port,
        base_path = %runtime.config().server.base_path,
        "Configuration loaded"
    );

    runtime.run().await
}
