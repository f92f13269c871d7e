//! cp command - Copy an object

use clap::Args;

use super::{GlobalArgs, parse_metadata, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy an object
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object key
    pub source: String,

    /// Destination object key
    pub destination: String,

    /// Metadata entry for the copy, repeatable
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, global: &GlobalArgs) -> ExitCode {
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

    let envelope = connector
        .copy(&args.source, &args.destination, &metadata)
        .await;
    report(&formatter, &envelope, |formatter, _| {
        formatter.success(&format!(
            "Copied '{}' to '{}'",
            formatter.style_name(&args.source),
            formatter.style_name(&args.destination)
        ));
    })
}
