//! Command-line interface for the `quarry` block search tool.

use std::{io, process::ExitCode};

use clap::Parser;
use quarry::cli::{CommandContext, args::Cli, commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "QUARRY_LOG";

/// Installs the stderr log subscriber, filtered by `QUARRY_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let ctx = match CommandContext::load(&cli.store) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &ctx)
}
