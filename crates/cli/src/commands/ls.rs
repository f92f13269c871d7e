//! ls command - List objects
//!
//! Lists objects under an optional prefix as a table of keys and sizes.

use clap::Args;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use s3c_core::ListOptions;
use s3c_core::types::DEFAULT_MAX_KEYS;
use serde_json::Value;

use super::{GlobalArgs, report, setup_connector};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, display_value, format_size};

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list keys starting with this prefix
    pub prefix: Option<String>,

    /// Maximum number of keys to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_KEYS)]
    pub max_keys: u32,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, global: &GlobalArgs) -> ExitCode {
    let formatter = Formatter::new(global.output_config());

    let connector = match setup_connector(global, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut options = ListOptions::default().max_keys(args.max_keys);
    if let Some(prefix) = args.prefix {
        options = options.prefix(prefix);
    }

    let envelope = connector.list(options).await;
    report(&formatter, &envelope, |formatter, data| {
        let files = data
            .get("files")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if files.is_empty() {
            formatter.println("No objects found.");
            return;
        }
        formatter.println(&render_table(formatter, files));
        formatter.println(&format!("\nTotal: {} object(s)", files.len()));
    })
}

/// Lay out listed entries; entries may be plain keys or objects with `key`/`size`
fn render_table(formatter: &Formatter, files: &[Value]) -> String {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled);

    for file in files {
        let (key, size) = match file {
            Value::Object(entry) => (
                entry.get("key").map(display_value).unwrap_or_default(),
                entry.get("size").and_then(Value::as_u64),
            ),
            other => (display_value(other), None),
        };
        let size = size.map(format_size).unwrap_or_default();
        table.add_row(vec![
            Cell::new(formatter.style_size(&size)).set_alignment(CellAlignment::Right),
            Cell::new(formatter.style_name(&key)),
        ]);
    }
    table.to_string()
}
