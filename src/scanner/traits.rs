//! Prober and observer abstractions.
//!
//! Defines the value types that flow through a scan, the `Prober` trait the
//! scheduler calls once per port, and the `ScanObserver` trait that receives
//! completions as they arrive.

use crate::types::{Port, PortRange};
use async_trait::async_trait;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// One bounded-time connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Address to connect to.
    pub target: IpAddr,
    /// Port to connect to.
    pub port: Port,
    /// Upper bound on the connection phase.
    pub timeout: Duration,
}

impl ProbeRequest {
    /// Create a new probe request.
    pub fn new(target: IpAddr, port: Port, timeout: Duration) -> Self {
        Self {
            target,
            port,
            timeout,
        }
    }

    /// Socket address of the probe.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.target, self.port.as_u16())
    }
}

/// Why a probe did not find an open port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// No answer within the wait time.
    Timeout,
    /// The peer actively rejected the connection.
    Refused,
    /// Any other socket-level error.
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Refused => write!(f, "connection refused"),
            Self::Other(detail) => write!(f, "{}", detail),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A connection was established.
    Open(Port),
    /// The peer refused the connection.
    Closed(Port),
    /// The probe timed out or hit another socket error.
    Failed { port: Port, reason: ProbeFailure },
}

impl ProbeOutcome {
    /// Shorthand for a timed out probe.
    pub fn timeout(port: Port) -> Self {
        Self::Failed {
            port,
            reason: ProbeFailure::Timeout,
        }
    }

    /// Shorthand for a probe that failed with some other error.
    pub fn other(port: Port, detail: impl Into<String>) -> Self {
        Self::Failed {
            port,
            reason: ProbeFailure::Other(detail.into()),
        }
    }

    /// The probed port.
    pub fn port(&self) -> Port {
        match self {
            Self::Open(port) | Self::Closed(port) | Self::Failed { port, .. } => *port,
        }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// The failure reason, if the port is not open. A closed port reports
    /// `Refused`.
    pub fn failure(&self) -> Option<ProbeFailure> {
        match self {
            Self::Open(_) => None,
            Self::Closed(_) => Some(ProbeFailure::Refused),
            Self::Failed { reason, .. } => Some(reason.clone()),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(port) => write!(f, "{} open", port),
            Self::Closed(port) => write!(f, "{} closed", port),
            Self::Failed { port, reason } => write!(f, "{} failed ({})", port, reason),
        }
    }
}

/// Trait for single-port probe implementations.
///
/// Implementations must capture every failure in the returned outcome. One
/// port's failure never aborts the batch.
///
/// # Example
///
/// ```ignore
/// use skiff::scanner::{Prober, ProbeRequest, TcpConnectProber};
///
/// let outcome = TcpConnectProber::new().probe(request).await;
/// println!("{}", outcome);
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port.
    async fn probe(&self, request: ProbeRequest) -> ProbeOutcome;
}

/// A shared prober for dynamic dispatch.
pub type SharedProber = std::sync::Arc<dyn Prober>;

/// Completion counters handed to observers with every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Outcomes received so far, including the current one.
    pub completed: usize,
    /// Ports in the job.
    pub total: usize,
}

/// What an observer learns when a scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanJobInfo {
    pub target: IpAddr,
    pub ports: PortRange,
    pub timeout: Duration,
    pub concurrency: usize,
}

/// Receives scan events as they happen.
///
/// Observers are purely side channels. They cannot fail and they never
/// influence scheduling.
pub trait ScanObserver: Send {
    /// Called once before any port is dispatched.
    fn on_start(&mut self, _job: &ScanJobInfo) {}

    /// Called once per completed probe, in arrival order.
    fn on_outcome(&mut self, _outcome: &ProbeOutcome, _progress: Progress) {}

    /// Called once after all workers are joined.
    fn on_finish(&mut self, _summary: &super::ScanSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ScanObserver for NullObserver {}
