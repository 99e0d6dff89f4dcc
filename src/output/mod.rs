//! Output formatting module.
//!
//! Console messages and the live scan reporter.

mod plain;
mod reporter;

pub use plain::{print_error, print_scan_header, print_warning};
pub use reporter::{open_port_line, summary_lines, ConsoleReporter};
