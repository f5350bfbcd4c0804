//! Implementation of `quarry config`.

use std::process::ExitCode;

use crate::cli::{context::CommandContext, output::print_highlighted_toml};

/// Shows effective configuration settings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    print_highlighted_toml(&ctx.config.settings_to_toml());
    ExitCode::SUCCESS
}
