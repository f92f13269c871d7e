//! Command definitions and dispatch
//!
//! Every subcommand builds its connector from the same layered settings:
//! config file, then `S3_CONNECTOR_*` environment variables, then flags.

mod completions;
mod connection;
mod cp;
mod download;
mod exists;
mod ls;
mod rm;
mod share;
mod stat;
mod system;
mod upload;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use s3c_core::{ConfigManager, ConnectorSettings, Envelope, S3Connector};
use serde_json::Value;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Command-line client for the S3 Connector API
#[derive(Parser, Debug)]
#[command(name = "s3c", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the S3 Connector API
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl GlobalArgs {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file
    Upload(upload::UploadArgs),

    /// Fetch download metadata, optionally saving the object locally
    Download(download::DownloadArgs),

    /// Remove an object
    Rm(rm::RmArgs),

    /// List objects
    Ls(ls::LsArgs),

    /// Show object metadata
    Stat(stat::StatArgs),

    /// Check whether an object exists
    Exists(exists::ExistsArgs),

    /// Copy an object
    Cp(cp::CpArgs),

    /// Generate a presigned URL
    Share(share::ShareArgs),

    /// Check service health
    Health,

    /// Check the service configuration
    ConfigCheck,

    /// Show bucket information
    BucketInfo,

    /// Remove temporary upload files on the service
    CleanupTemp,

    /// Test connectivity and credentials
    Test,

    /// Show client configuration and supported operations
    Info,

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the parsed command line
pub async fn execute(cli: Cli) -> ExitCode {
    let global = cli.global;
    match cli.command {
        Commands::Upload(args) => upload::execute(args, &global).await,
        Commands::Download(args) => download::execute(args, &global).await,
        Commands::Rm(args) => rm::execute(args, &global).await,
        Commands::Ls(args) => ls::execute(args, &global).await,
        Commands::Stat(args) => stat::execute(args, &global).await,
        Commands::Exists(args) => exists::execute(args, &global).await,
        Commands::Cp(args) => cp::execute(args, &global).await,
        Commands::Share(args) => share::execute(args, &global).await,
        Commands::Health => system::health(&global).await,
        Commands::ConfigCheck => system::config_check(&global).await,
        Commands::BucketInfo => system::bucket_info(&global).await,
        Commands::CleanupTemp => system::cleanup_temp(&global).await,
        Commands::Test => connection::test(&global).await,
        Commands::Info => connection::info(&global),
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load settings from the config file and environment, then apply flags
pub fn load_settings(global: &GlobalArgs) -> anyhow::Result<ConnectorSettings> {
    let manager = match &global.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut settings = manager
        .load()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;
    settings
        .apply_env()
        .context("Invalid S3_CONNECTOR_* environment variable")?;

    if let Some(base_url) = &global.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(api_key) = &global.api_key {
        settings.api_key = Some(api_key.clone());
    }
    if let Some(timeout) = global.timeout {
        settings.timeout_secs = timeout;
    }
    Ok(settings)
}

/// Build a connector, reporting configuration problems as usage errors
pub fn setup_connector(global: &GlobalArgs, formatter: &Formatter) -> Result<S3Connector, ExitCode> {
    let settings = match load_settings(global) {
        Ok(s) => s,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return Err(ExitCode::UsageError);
        }
    };

    let config = match settings.client_config() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return Err(ExitCode::UsageError);
        }
    };

    tracing::debug!(base_url = %config.base_url(), timeout = config.timeout_secs(), "Connector configured");

    match s3c_http::connect(config) {
        Ok(connector) => Ok(connector.with_defaults(settings.operation_defaults())),
        Err(e) => {
            formatter.error(&format!("Failed to create HTTP client: {e}"));
            Err(ExitCode::GeneralError)
        }
    }
}

/// Print an envelope and derive the exit code from its status
///
/// JSON mode prints the envelope as-is. Otherwise failures print the error
/// message and successes are handed to `render` with the `data` payload.
pub fn report<F>(formatter: &Formatter, envelope: &Envelope, render: F) -> ExitCode
where
    F: FnOnce(&Formatter, &Value),
{
    if formatter.is_json() {
        formatter.json(envelope);
    }

    match envelope {
        Envelope::Success { data, .. } => {
            if !formatter.is_json() {
                render(formatter, data.as_ref().unwrap_or(&Value::Null));
            }
            ExitCode::Success
        }
        Envelope::Failure {
            error, status_code, ..
        } => {
            if !formatter.is_json() {
                formatter.error(error);
            }
            ExitCode::from_status(*status_code)
        }
    }
}

/// Parse repeated `key=value` arguments into a metadata map
pub fn parse_metadata(entries: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut metadata = BTreeMap::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((k, v)) => {
                if k.is_empty() {
                    return Err(format!(
                        "Invalid metadata format: '{entry}' (key cannot be empty)"
                    ));
                }
                metadata.insert(k.to_string(), v.to_string());
            }
            None => {
                return Err(format!(
                    "Invalid metadata format: '{entry}' (expected key=value)"
                ));
            }
        }
    }
    Ok(metadata)
}
