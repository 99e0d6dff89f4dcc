//! Cooperative cancellation for running scans.
//!
//! A `CancelHandle` is held by whoever may interrupt a scan (the Ctrl-C
//! handler in the binary, or a test). Every worker and the coordinator hold a
//! `CancelSignal` cloned from it.

use tokio::sync::watch;

/// Sending half: requests cancellation.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Receiving half: observed by the scheduler and its workers.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Get a new signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        Self { rx }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// If the handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        let handle_dropped = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if handle_dropped {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let (handle, mut signal) = cancel_pair();
        let mut other = handle.signal();
        assert!(!signal.is_cancelled());

        handle.cancel();

        assert!(signal.is_cancelled());
        tokio_test::assert_ok!(timeout(Duration::from_secs(1), signal.cancelled()).await);
        tokio_test::assert_ok!(timeout(Duration::from_secs(1), other.cancelled()).await);
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let mut signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        tokio_test::assert_err!(timeout(Duration::from_millis(20), signal.cancelled()).await);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (handle, signal) = cancel_pair();
        handle.cancel();
        handle.cancel();
        assert!(signal.is_cancelled());
    }
}
