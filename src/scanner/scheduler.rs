//! Scan scheduler.
//!
//! Runs one scan job on a fixed pool of worker tasks. Workers pull ports from
//! a shared queue and send each outcome back over a channel; the coordinator
//! counts completions, forwards them to the observer as they arrive, and joins
//! every worker before building the summary.

use crate::error::{ScanError, ScanResult};
use crate::scanner::cancel::CancelSignal;
use crate::scanner::traits::{
    ProbeFailure, ProbeOutcome, ProbeRequest, Progress, ScanJobInfo, ScanObserver, SharedProber,
};
use crate::types::{Port, PortRange, Ports};
use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default per-port connection timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// Running counters for a job, safe to read while the scan is in progress.
#[derive(Debug, Default)]
pub struct ScanTally {
    dispatched: AtomicUsize,
    completed: AtomicUsize,
}

impl ScanTally {
    /// Ports handed to a worker so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Acquire)
    }

    /// Outcomes received by the coordinator so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::AcqRel);
    }

    fn record_completion(&self) -> usize {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// A single scan: one target, one port range, one timeout.
#[derive(Debug)]
pub struct ScanJob {
    target: IpAddr,
    ports: PortRange,
    timeout: Duration,
    tally: Arc<ScanTally>,
}

impl ScanJob {
    /// Create a new job.
    pub fn new(target: IpAddr, ports: PortRange, timeout: Duration) -> Self {
        Self {
            target,
            ports,
            timeout,
            tally: Arc::new(ScanTally::default()),
        }
    }

    /// Address being scanned.
    pub fn target(&self) -> IpAddr {
        self.target
    }

    /// Ports being scanned.
    pub fn ports(&self) -> PortRange {
        self.ports
    }

    /// Number of probes the job will issue.
    pub fn total(&self) -> usize {
        self.ports.len()
    }

    /// Shared handle to the live counters.
    pub fn tally(&self) -> Arc<ScanTally> {
        Arc::clone(&self.tally)
    }
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every port produced an outcome.
    Completed,
    /// Cancellation stopped the scan early.
    Interrupted,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Aggregate result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub target: IpAddr,
    pub ports: PortRange,
    pub status: ScanStatus,
    /// Open ports, ascending.
    pub open_ports: Vec<Port>,
    pub closed: usize,
    pub timed_out: usize,
    pub errored: usize,
    pub total: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    /// Whether the scan was cut short.
    pub fn is_interrupted(&self) -> bool {
        self.status == ScanStatus::Interrupted
    }
}

/// Coordinator-side bookkeeping for received outcomes.
struct Collector {
    tally: Arc<ScanTally>,
    total: usize,
    open_ports: Vec<Port>,
    closed: usize,
    timed_out: usize,
    errored: usize,
}

impl Collector {
    fn new(tally: Arc<ScanTally>, total: usize) -> Self {
        Self {
            tally,
            total,
            open_ports: Vec::new(),
            closed: 0,
            timed_out: 0,
            errored: 0,
        }
    }

    /// Count one outcome and pass it straight on to the observer.
    fn accept(&mut self, outcome: ProbeOutcome, observer: &mut dyn ScanObserver) {
        let completed = self.tally.record_completion();

        match &outcome {
            ProbeOutcome::Open(port) => self.open_ports.push(*port),
            ProbeOutcome::Closed(_) => self.closed += 1,
            ProbeOutcome::Failed {
                reason: ProbeFailure::Timeout,
                ..
            } => self.timed_out += 1,
            ProbeOutcome::Failed { .. } => self.errored += 1,
        }
        if !outcome.is_open() {
            trace!(outcome = %outcome, "port not open");
        }

        observer.on_outcome(
            &outcome,
            Progress {
                completed,
                total: self.total,
            },
        );
    }
}

/// Distributes a job's ports over a bounded worker pool.
///
/// # Example
///
/// ```ignore
/// use skiff::scanner::{Scheduler, ScanJob, TcpConnectProber, NullObserver, CancelSignal};
///
/// let scheduler = Scheduler::new(Arc::new(TcpConnectProber::new())).with_concurrency(10);
/// let job = ScanJob::new(ip, "1-1024".parse()?, Duration::from_millis(50));
/// let summary = scheduler.run(job, &mut NullObserver, CancelSignal::never()).await?;
/// ```
#[derive(Clone)]
pub struct Scheduler {
    prober: SharedProber,
    concurrency: usize,
}

impl Scheduler {
    /// Create a scheduler with the default pool size.
    pub fn new(prober: SharedProber) -> Self {
        Self {
            prober,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the worker pool size.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Configured worker pool size.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `job` to completion or until `cancel` fires.
    ///
    /// Returns only after every spawned worker has been joined. Open ports are
    /// passed to `observer` as soon as they are received.
    pub async fn run(
        &self,
        job: ScanJob,
        observer: &mut dyn ScanObserver,
        mut cancel: CancelSignal,
    ) -> ScanResult<ScanSummary> {
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let started = Instant::now();
        let total = job.total();
        let pool_size = self.concurrency.min(total);

        observer.on_start(&ScanJobInfo {
            target: job.target,
            ports: job.ports,
            timeout: job.timeout,
            concurrency: pool_size,
        });
        debug!(addr = %job.target, ports = %job.ports, workers = pool_size, "starting scan");

        let queue = Arc::new(Mutex::new(job.ports.iter()));
        let (results_tx, mut results) = mpsc::unbounded_channel();
        let mut pool = JoinSet::new();

        for id in 0..pool_size {
            let worker = Worker {
                id,
                queue: Arc::clone(&queue),
                prober: Arc::clone(&self.prober),
                target: job.target,
                timeout: job.timeout,
                tally: Arc::clone(&job.tally),
                results: results_tx.clone(),
                cancel: cancel.clone(),
            };
            pool.spawn(worker.run());
        }
        // The channel closes once the last worker exits
        drop(results_tx);

        let mut collector = Collector::new(job.tally(), total);

        let mut interrupted = false;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                received = results.recv() => match received {
                    Some(outcome) => collector.accept(outcome, observer),
                    None => break,
                },
            }
        }

        if interrupted {
            warn!(
                completed = job.tally.completed(),
                total, "scan interrupted, abandoning in-flight probes"
            );
            pool.abort_all();
        }

        let mut failure = None;
        while let Some(joined) = pool.join_next().await {
            match joined {
                Err(e) if e.is_panic() && failure.is_none() => failure = Some(e.to_string()),
                _ => {}
            }
        }

        // Outcomes sent before the workers stopped still count
        while let Ok(outcome) = results.try_recv() {
            collector.accept(outcome, observer);
        }

        if let Some(reason) = failure {
            return Err(ScanError::WorkerFailed(reason));
        }

        // Workers only stop early on cancellation or a panic, handled above
        let completed = job.tally.completed();
        let status = if completed == total {
            ScanStatus::Completed
        } else {
            ScanStatus::Interrupted
        };

        let mut open_ports = collector.open_ports;
        open_ports.sort_unstable();

        let summary = ScanSummary {
            target: job.target,
            ports: job.ports,
            status,
            open_ports,
            closed: collector.closed,
            timed_out: collector.timed_out,
            errored: collector.errored,
            total,
            dispatched: job.tally.dispatched(),
            completed,
            elapsed: started.elapsed(),
        };
        debug!(
            status = %summary.status,
            open = summary.open_ports.len(),
            completed = summary.completed,
            total,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "scan finished"
        );

        observer.on_finish(&summary);
        Ok(summary)
    }
}

/// One member of the pool.
struct Worker {
    id: usize,
    queue: Arc<Mutex<Ports>>,
    prober: SharedProber,
    target: IpAddr,
    timeout: Duration,
    tally: Arc<ScanTally>,
    results: mpsc::UnboundedSender<ProbeOutcome>,
    cancel: CancelSignal,
}

impl Worker {
    async fn run(self) {
        while !self.cancel.is_cancelled() {
            let Some(port) = self.next_port() else {
                break;
            };
            self.tally.record_dispatch();

            let request = ProbeRequest::new(self.target, port, self.timeout);
            let outcome = self.prober.probe(request).await;

            if self.results.send(outcome).is_err() {
                break;
            }
        }
        trace!(worker = self.id, "worker finished");
    }

    fn next_port(&self) -> Option<Port> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }
}
