//! download command - Fetch download metadata, optionally saving the object
//!
//! Without `--output` only the metadata call is made. With it, the content is
//! fetched in a second request and written to the local path.

use clap::Args;
use s3c_core::DownloadOutcome;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, format_size};

/// Fetch download metadata, optionally saving the object locally
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Object key
    pub key: String,

    /// Save the object content to this local path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let outcome = connector.download(&args.key, args.output.as_deref()).await;

    match &outcome {
        DownloadOutcome::Metadata(envelope) => {
            report(&formatter, envelope, |formatter, data| formatter.properties(data))
        }
        DownloadOutcome::Saved {
            local_path,
            bytes_written,
            ..
        } => {
            if formatter.is_json() {
                formatter.json(&outcome);
            } else {
                formatter.success(&format!(
                    "Downloaded '{}' to '{local_path}' ({})",
                    formatter.style_name(&args.key),
                    formatter.style_size(&format_size(*bytes_written))
                ));
            }
            ExitCode::Success
        }
        DownloadOutcome::SaveFailed {
            error, status_code, ..
        } => {
            if formatter.is_json() {
                formatter.json(&outcome);
            } else {
                formatter.warning(&format!(
                    "'{}' is available but was not saved",
                    formatter.style_name(&args.key)
                ));
                formatter.error(error);
            }
            ExitCode::from_status(*status_code)
        }
    }
}
