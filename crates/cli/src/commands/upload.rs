//! upload command - Upload a local file
//!
//! Sends the file as multipart form data. A destination ending in `/` keeps
//! the local file name.

use clap::Args;
use s3c_core::{UploadOptions, UploadSource, Visibility};
use serde_json::Value;

use super::{GlobalArgs, parse_metadata, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Upload a local file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub file: String,

    /// Destination path or prefix (e.g. documents/invoices/)
    #[arg(default_value = "")]
    pub path: String,

    /// Object visibility (private, public-read, public-read-write, authenticated-read)
    #[arg(long)]
    pub visibility: Option<Visibility>,

    /// Metadata entry, repeatable
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let metadata = match parse_metadata(&args.metadata) {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let options = UploadOptions {
        metadata,
        visibility: args.visibility,
    };

    let envelope = connector
        .upload(UploadSource::local(&args.file), &args.path, options)
        .await;

    report(&formatter, &envelope, |formatter, data| {
        let key = data.get("key").and_then(Value::as_str).unwrap_or(&args.path);
        formatter.success(&format!(
            "Uploaded '{}' to '{}'",
            args.file,
            formatter.style_name(key)
        ));
    })
}
