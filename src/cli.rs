//! Command-line interface definitions for skiff.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags that are
//! not given fall back to the settings file, then to built-in defaults.

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output::{self, ConsoleReporter};
use crate::scanner::{CancelSignal, ScanJob, ScanSummary, Scheduler, TcpConnectProber};
use crate::types::{PortRange, TargetSpec};
use chrono::Local;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A small concurrent TCP port scanner.
#[derive(Parser, Debug)]
#[command(name = "skiff")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A small concurrent TCP port scanner", long_about = None)]
#[command(after_help = "Only scan hosts you are authorised to test.")]
pub struct Args {
    /// Target IP address or hostname (e.g. 192.168.1.1, example.com)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Port or port range (e.g. 22, 20-443) [default: 1-65535]
    #[arg(short = 'p', long = "port", env = "SKIFF_PORT")]
    pub port: Option<String>,

    /// Seconds to wait for each connection [default: 0.05]
    #[arg(short = 'w', long = "wait", env = "SKIFF_WAIT", allow_negative_numbers = true)]
    pub wait: Option<f64>,

    /// Maximum number of simultaneous connection attempts [default: 10]
    #[arg(short = 'c', long, env = "SKIFF_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Path to a settings file
    #[arg(long, env = "SKIFF_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the banner and progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Scan parameters after flags and settings are merged and validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub ports: PortRange,
    pub wait: Duration,
    pub concurrency: usize,
}

impl Args {
    /// Merge flags over `settings` and validate the result.
    pub fn scan_options(&self, settings: &AppSettings) -> CliResult<ScanOptions> {
        let ports = PortRange::parse(self.port.as_deref().unwrap_or(&settings.default_ports))?;

        let wait_secs = self.wait.unwrap_or(settings.default_wait_secs);
        // Positive waits below a nanosecond round up to one
        let wait = Duration::try_from_secs_f64(wait_secs)
            .ok()
            .filter(|_| wait_secs > 0.0)
            .map(|wait| wait.max(Duration::from_nanos(1)))
            .ok_or(CliError::InvalidWait(wait_secs))?;

        let concurrency = self.concurrency.unwrap_or(settings.default_concurrency);
        if concurrency == 0 {
            return Err(CliError::InvalidConcurrency(concurrency));
        }

        Ok(ScanOptions {
            ports,
            wait,
            concurrency,
        })
    }

    /// Run the scan described by these arguments.
    ///
    /// Argument and settings errors are reported before the target is
    /// resolved; resolution happens once, before any port is probed.
    pub async fn execute(&self, cancel: CancelSignal) -> CliResult<ScanSummary> {
        let settings = AppSettings::load(self.config.as_deref())?;
        let options = self.scan_options(&settings)?;
        let target = TargetSpec::parse(&self.target)?.resolve().await?;

        info!(
            addr = %target.ip,
            ports = %options.ports,
            wait_ms = options.wait.as_millis() as u64,
            concurrency = options.concurrency,
            "scan configured"
        );

        if !self.quiet {
            output::print_scan_header(&target, &options.ports, Local::now());
        }

        let scheduler = Scheduler::new(Arc::new(TcpConnectProber::new()))
            .with_concurrency(options.concurrency);
        let job = ScanJob::new(target.ip, options.ports, options.wait);
        let mut reporter = ConsoleReporter::new(!self.quiet);

        Ok(scheduler.run(job, &mut reporter, cancel).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, PortError};
    use clap::CommandFactory;
    use std::io::Write;
    use tokio::net::TcpListener;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("skiff").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let args = parse(&["example.com"]);
        let options = args.scan_options(&AppSettings::default()).unwrap();

        assert_eq!(options.ports, PortRange::full());
        assert_eq!(options.wait, Duration::from_millis(50));
        assert_eq!(options.concurrency, 10);
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&["10.0.0.1", "-p", "20-443", "-w", "0.25", "-c", "64"]);
        let settings = AppSettings {
            default_ports: "1-100".to_string(),
            default_wait_secs: 2.0,
            default_concurrency: 3,
        };

        let options = args.scan_options(&settings).unwrap();

        assert_eq!(options.ports.to_string(), "20-443");
        assert_eq!(options.wait, Duration::from_millis(250));
        assert_eq!(options.concurrency, 64);
    }

    #[test]
    fn test_invalid_arguments() {
        let settings = AppSettings::default();

        let args = parse(&["10.0.0.1", "-p", "10-5"]);
        assert!(matches!(
            args.scan_options(&settings),
            Err(CliError::Port(PortError::InvalidOrder(_)))
        ));

        for wait in ["0", "-0.0", "-1", "NaN", "inf"] {
            let args = parse(&["10.0.0.1", "--wait", wait]);
            let err = args.scan_options(&settings).unwrap_err();
            assert!(matches!(err, CliError::InvalidWait(_)), "wait {}", wait);
            assert_eq!(err.exit_code(), 1);
        }

        let args = parse(&["10.0.0.1", "-c", "0"]);
        assert!(matches!(
            args.scan_options(&settings),
            Err(CliError::InvalidConcurrency(0))
        ));
    }

    #[test]
    fn test_tiny_wait_rounds_up_to_a_nanosecond() {
        let args = parse(&["10.0.0.1", "-w", "0.0000000001"]);
        let options = args.scan_options(&AppSettings::default()).unwrap();
        assert_eq!(options.wait, Duration::from_nanos(1));
    }

    #[test]
    fn test_verbosity_counts() {
        assert_eq!(parse(&["host", "-vv"]).verbose, 2);
        assert!(parse(&["host", "-q"]).quiet);
    }

    #[tokio::test]
    async fn test_execute_finds_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut settings = tempfile::NamedTempFile::new().unwrap();
        settings.write_all(b"{}").unwrap();
        let config = settings.path().to_string_lossy().into_owned();
        let port_arg = port.to_string();

        let args = parse(&[
            "127.0.0.1",
            "-p",
            port_arg.as_str(),
            "-w",
            "0.5",
            "-q",
            "--config",
            config.as_str(),
        ]);
        let summary = args.execute(CancelSignal::never()).await.unwrap();

        assert!(!summary.is_interrupted());
        assert_eq!(summary.total, 1);
        assert_eq!(summary.open_ports, vec![Port::new(port).unwrap()]);
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_target_before_scanning() {
        let args = parse(&["not a host", "-p", "80", "-q"]);
        let err = args.execute(CancelSignal::never()).await.unwrap_err();
        assert!(matches!(err, CliError::Target(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
