//! Output formatting
//!
//! Human-readable or JSON output, selected by the global flags.

mod formatter;

pub use formatter::{Formatter, display_value, format_size};

/// Output settings shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Print machine-readable JSON instead of text
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
