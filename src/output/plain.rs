//! Plain text output helpers.
//!
//! Produces human-readable messages with colors and formatting.

use crate::types::{PortRange, ScanTarget};
use chrono::{DateTime, Local};
use console::style;

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &ScanTarget, ports: &PortRange, started: DateTime<Local>) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("skiff").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    println!(
        "{} Scanning {} ports ({})...",
        style("•").dim(),
        style(ports.len()).white().bold(),
        ports
    );
    println!(
        "{} Started on {} @ {}",
        style("•").dim(),
        started.format("%x"),
        started.format("%X")
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
