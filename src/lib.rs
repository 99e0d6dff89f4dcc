//! # skiff - a small concurrent TCP port scanner
//!
//! skiff attempts a TCP connection to every port in a range on one target,
//! each bounded by a short wait, and reports the ports that accept.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use skiff::scanner::{CancelSignal, NullObserver, ScanJob, Scheduler, TcpConnectProber};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = "192.168.1.1".parse().unwrap();
//!     let ports = "20-443".parse().unwrap();
//!
//!     let scheduler = Scheduler::new(Arc::new(TcpConnectProber::new())).with_concurrency(10);
//!     let job = ScanJob::new(target, ports, Duration::from_millis(50));
//!     let summary = scheduler
//!         .run(job, &mut NullObserver, CancelSignal::never())
//!         .await
//!         .unwrap();
//!
//!     for port in summary.open_ports {
//!         println!("{} is open", port);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - port ranges and targets, with parsing
//! - [`scanner`] - the prober, the scheduler and its worker pool, cancellation
//! - [`output`] - console reporter and messages
//! - [`config`] - settings file
//! - [`cli`] - command-line arguments and orchestration
//! - [`error`] - error types and exit codes

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{ProbeOutcome, Prober, ScanSummary, Scheduler};
pub use types::{Port, PortRange, ScanTarget, TargetSpec};
