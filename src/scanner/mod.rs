//! Scanner module: the concurrent scan engine.
//!
//! - [`traits`] - probe value types, the `Prober` trait and the `ScanObserver` trait
//! - [`tcp`] - TCP connect prober
//! - [`scheduler`] - bounded worker pool that runs a `ScanJob`
//! - [`cancel`] - cancellation handle and signal

pub mod cancel;
pub mod scheduler;
pub mod tcp;
pub mod traits;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use scheduler::{
    ScanJob, ScanStatus, ScanSummary, ScanTally, Scheduler, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT,
};
pub use tcp::TcpConnectProber;
pub use traits::{
    NullObserver, ProbeFailure, ProbeOutcome, ProbeRequest, Prober, Progress, ScanJobInfo,
    ScanObserver, SharedProber,
};
