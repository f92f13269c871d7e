//! share command - Generate presigned URLs
//!
//! Asks the service for a time-limited URL to download or upload an object.

use clap::Args;
use s3c_core::{PresignOperation, PresignOptions};
use serde_json::Value;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Longest lifetime most S3-compatible services accept for a presigned URL
const MAX_EXPIRATION_SECS: u64 = 604800;

/// Generate a presigned URL for an object
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Object key
    pub key: String,

    /// Expiration time (e.g., 30m, 1h, 7d). Default: configured expiration
    #[arg(short, long)]
    pub expire: Option<String>,

    /// Generate upload URL instead of download URL
    #[arg(long)]
    pub upload: bool,
}

/// Execute the share command
pub async fn execute(args: ShareArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let expires_in = match args.expire.as_deref().map(parse_expiration).transpose() {
        Ok(secs) => secs,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    if expires_in.is_some_and(|secs| secs > MAX_EXPIRATION_SECS) {
        formatter.error("Expiration cannot exceed 7 days (604800 seconds)");
        return ExitCode::UsageError;
    }

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let operation = if args.upload {
        PresignOperation::PutObject
    } else {
        PresignOperation::GetObject
    };

    let envelope = connector
        .presigned_url(
            &args.key,
            PresignOptions {
                expires_in,
                operation,
            },
        )
        .await;

    report(&formatter, &envelope, |formatter, data| {
        let url_type = if args.upload { "upload" } else { "download" };
        let url = data.get("url").and_then(Value::as_str).unwrap_or_default();

        formatter.println(&format!("Share URL ({url_type}):"));
        formatter.println(&formatter.style_url(url));
        if let Some(secs) = data.get("expires_in").and_then(Value::as_u64) {
            formatter.println("");
            formatter.println(&format!("Expires in: {}", format_duration(secs)));
        }
        if args.upload {
            formatter.println("");
            formatter.println("Upload with: curl -X PUT -T <file> \"<url>\"");
        }
    })
}

/// Parse expiration string (e.g., "1h", "1d", "7d")
fn parse_expiration(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Expiration cannot be empty".to_string());
    }

    let (num_str, suffix) = if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
        let idx = s.len() - 1;
        (&s[..idx], &s[idx..])
    } else {
        (s, "s") // Default to seconds
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("Invalid expiration number: {num_str}"))?;

    let multiplier = match suffix.to_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 604800,
        _ => return Err(format!("Unknown expiration suffix: {suffix}")),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("Expiration is too large: '{s}'"))
}

/// Format duration in human-readable form
fn format_duration(secs: u64) -> String {
    if secs >= 86400 {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days} day(s)")
        }
    } else if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{hours} hour(s)")
        }
    } else if secs >= 60 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{secs} second(s)")
    }
}
