//! s3c - command-line client for the S3 Connector API
//!
//! Exposes every connector operation as a subcommand with human-readable or
//! JSON output and stable exit codes.

mod commands;
mod exit_code;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    commands::execute(cli).await.into()
}

/// Log to stderr; `--debug` forces debug level, otherwise `RUST_LOG` or warn
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
