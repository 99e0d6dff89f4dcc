//! Console scan reporter.
//!
//! Renders a progress bar while a scan runs, prints a line for every open
//! port the moment it is found, and closes with a summary line. Nothing here
//! can fail the scan: write errors are logged and dropped.

use crate::scanner::{ProbeOutcome, Progress, ScanJobInfo, ScanObserver, ScanSummary};
use crate::types::Port;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::IpAddr;
use tracing::debug;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%, eta {eta}) {msg}";

/// Observer that writes to the terminal.
pub struct ConsoleReporter {
    show_progress: bool,
    progress: Option<ProgressBar>,
    target: Option<IpAddr>,
}

impl ConsoleReporter {
    /// Create a reporter. With `show_progress` off only report lines are
    /// printed.
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            progress: None,
            target: None,
        }
    }

    fn progress_bar(job: &ScanJobInfo) -> ProgressBar {
        let pb = ProgressBar::new(job.ports.len() as u64);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message(format!("ports {}", job.ports));
        pb
    }

    /// Print a line without tearing the progress bar.
    fn emit(&self, line: impl std::fmt::Display) {
        match &self.progress {
            Some(pb) if !pb.is_hidden() => pb.println(line.to_string()),
            _ => {
                if let Err(e) = writeln!(io::stdout().lock(), "{}", line) {
                    debug!(error = %e, "failed to write report line");
                }
            }
        }
    }
}

impl ScanObserver for ConsoleReporter {
    fn on_start(&mut self, job: &ScanJobInfo) {
        self.target = Some(job.target);
        if self.show_progress {
            self.progress = Some(Self::progress_bar(job));
        }
    }

    fn on_outcome(&mut self, outcome: &ProbeOutcome, progress: Progress) {
        if let Some(pb) = &self.progress {
            pb.set_position(progress.completed as u64);
        }

        if let (ProbeOutcome::Open(port), Some(target)) = (outcome, self.target) {
            self.emit(style(open_port_line(target, *port)).green());
        }
    }

    fn on_finish(&mut self, summary: &ScanSummary) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }

        for line in summary_lines(summary) {
            self.emit(line);
        }
    }
}

/// The line printed when an open port is found.
pub fn open_port_line(target: IpAddr, port: Port) -> String {
    format!("{} - open port: {}", target, port)
}

/// Lines printed once a scan has ended.
pub fn summary_lines(summary: &ScanSummary) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);

    if summary.is_interrupted() {
        lines.push(format!(
            "Scan interrupted: {}/{} ports probed on {}",
            summary.completed, summary.total, summary.target
        ));
        if !summary.open_ports.is_empty() {
            let found: Vec<String> = summary.open_ports.iter().map(Port::to_string).collect();
            lines.push(format!("Open ports found so far: {}", found.join(", ")));
        }
        return lines;
    }

    if summary.ports.is_single() {
        lines.push(format!(
            "Scanning complete! Scanned {} @ port {}",
            summary.target,
            summary.ports.start()
        ));
    } else {
        lines.push(format!(
            "Scanning complete! Scanned {} from ports {} through {}",
            summary.target,
            summary.ports.start(),
            summary.ports.end()
        ));
    }

    lines.push(format!(
        "{} open, {} closed, {} timed out, {} errored in {:.2}s",
        summary.open_ports.len(),
        summary.closed,
        summary.timed_out,
        summary.errored,
        summary.elapsed.as_secs_f64()
    ));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanStatus;
    use crate::types::PortRange;
    use std::time::Duration;

    fn summary(ports: &str, status: ScanStatus, open: &[u16], completed: usize) -> ScanSummary {
        let ports: PortRange = ports.parse().unwrap();
        ScanSummary {
            target: "10.0.0.5".parse().unwrap(),
            ports,
            status,
            open_ports: open.iter().filter_map(|&p| Port::new(p)).collect(),
            closed: completed - open.len(),
            timed_out: 0,
            errored: 0,
            total: ports.len(),
            dispatched: completed,
            completed,
            elapsed: Duration::from_millis(1250),
        }
    }

    #[test]
    fn test_open_port_line() {
        let line = open_port_line("127.0.0.1".parse().unwrap(), Port::new(8001).unwrap());
        assert_eq!(line, "127.0.0.1 - open port: 8001");
    }

    #[test]
    fn test_summary_for_range() {
        let lines = summary_lines(&summary("8000-8002", ScanStatus::Completed, &[8001], 3));
        assert_eq!(
            lines[0],
            "Scanning complete! Scanned 10.0.0.5 from ports 8000 through 8002"
        );
        assert_eq!(lines[1], "1 open, 2 closed, 0 timed out, 0 errored in 1.25s");
    }

    #[test]
    fn test_summary_for_single_port() {
        let lines = summary_lines(&summary("22", ScanStatus::Completed, &[], 1));
        assert_eq!(lines[0], "Scanning complete! Scanned 10.0.0.5 @ port 22");
    }

    #[test]
    fn test_summary_for_interrupted_scan() {
        let lines = summary_lines(&summary("1-1000", ScanStatus::Interrupted, &[80, 22], 120));
        assert_eq!(lines[0], "Scan interrupted: 120/1000 ports probed on 10.0.0.5");
        assert_eq!(lines[1], "Open ports found so far: 80, 22");
    }

    #[test]
    fn test_reporter_without_progress_bar_survives_full_cycle() {
        let mut reporter = ConsoleReporter::new(false);
        let finished = summary("79-81", ScanStatus::Completed, &[80], 3);
        reporter.on_start(&ScanJobInfo {
            target: finished.target,
            ports: finished.ports,
            timeout: Duration::from_millis(50),
            concurrency: 3,
        });
        reporter.on_outcome(
            &ProbeOutcome::Open(Port::new(80).unwrap()),
            Progress {
                completed: 1,
                total: 3,
            },
        );
        reporter.on_finish(&finished);
        assert!(reporter.progress.is_none());
    }
}
