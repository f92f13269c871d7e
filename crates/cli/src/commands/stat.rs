//! stat command - Show object metadata

use clap::Args;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Object key
    pub key: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let envelope = connector.metadata(&args.key).await;
    report(&formatter, &envelope, |formatter, data| formatter.properties(data))
}
