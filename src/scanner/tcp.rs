//! TCP connect prober.
//!
//! Performs standard TCP connect probes using the operating system's
//! socket API. Each probe owns a fresh socket that is closed when the
//! probe returns, whatever the outcome.

use crate::scanner::traits::{ProbeFailure, ProbeOutcome, ProbeRequest, Prober};
use async_trait::async_trait;
use socket2::SockRef;
use std::io;
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::trace;

/// TCP connect prober.
///
/// Uses plain `connect()` calls and needs no elevated privileges. A single
/// attempt per port is authoritative; lossy links can produce false
/// negatives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    /// Create a new TCP connect prober.
    pub fn new() -> Self {
        Self
    }

    /// Open a socket and connect it, bounded by the request timeout.
    async fn attempt_connect(request: &ProbeRequest) -> Result<TcpStream, ProbeFailure> {
        let addr = request.socket_addr();
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|e| ProbeFailure::Other(e.to_string()))?;

        match timeout(request.timeout, socket.connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(ProbeFailure::Refused)
            }
            Ok(Err(e)) => Err(ProbeFailure::Other(e.to_string())),
            Err(_) => Err(ProbeFailure::Timeout),
        }
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, request: ProbeRequest) -> ProbeOutcome {
        let port = request.port;

        match Self::attempt_connect(&request).await {
            Ok(stream) => {
                // RST instead of FIN so long scans don't pile up TIME_WAIT sockets
                if let Err(e) = SockRef::from(&stream).set_linger(Some(Duration::ZERO)) {
                    trace!(port = %port, error = %e, "could not set SO_LINGER");
                }
                drop(stream);
                ProbeOutcome::Open(port)
            }
            Err(ProbeFailure::Refused) => ProbeOutcome::Closed(port),
            Err(reason) => ProbeOutcome::Failed { port, reason },
        }
    }
}
