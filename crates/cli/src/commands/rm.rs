//! rm command - Remove an object

use clap::Args;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove an object
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object key
    pub key: String,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let envelope = connector.delete(&args.key).await;
    report(&formatter, &envelope, |formatter, _| {
        formatter.success(&format!("Removed '{}'", formatter.style_name(&args.key)));
    })
}
