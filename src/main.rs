//! This is the main entry point for the `jobs-done` binary.

use clap::Parser;
use jobs_done::{
    console_utils::{StderrWriter, TracingFormatter, get_default_env_filter},
    list_from_args,
    opt::{App, SubCommands},
    resolve_from_args,
};
use miette::IntoDiagnostic;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> miette::Result<()> {
    let args = App::parse();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => get_default_env_filter(args.verbose.log_level_filter()).into_diagnostic()?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(StderrWriter)
                .event_format(TracingFormatter),
        )
        .init();

    match args.subcommand {
        SubCommands::Resolve(args) => resolve_from_args(args),
        SubCommands::List(args) => list_from_args(args),
    }
}
