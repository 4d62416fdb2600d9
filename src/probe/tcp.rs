//! TCP connect probe.
//!
//! Succeeds when a full TCP handshake completes within the timeout. There
//! is no protocol layer, so this probe never reports an auth failure.

use super::{Outcome, Probe, ProbeKind};
use crate::error::{AttemptResult, ProbeError};
use crate::types::{Port, Target};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Dial `addr`, bounded by `limit`.
pub(crate) async fn connect_with_timeout(
    addr: SocketAddr,
    limit: Duration,
) -> AttemptResult<TcpStream> {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ProbeError::from_connect(e)),
        Err(_) => Err(ProbeError::Timeout),
    }
}

/// TCP connect probe.
///
/// Targets without a port are dialed on the default port given at
/// construction.
pub struct TcpConnectProbe {
    default_port: Port,
}

impl TcpConnectProbe {
    /// Create a new TCP connect probe.
    pub fn new(default_port: Port) -> Self {
        Self { default_port }
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }

    async fn probe(&self, target: &Target, timeout: Duration) -> Outcome {
        let addr = target.socket_addr(self.default_port);

        match connect_with_timeout(addr, timeout).await {
            Ok(stream) => {
                drop(stream);
                Outcome::Success
            }
            Err(e) => {
                debug!(host = %addr, error = %e, "tcp connect failed");
                e.outcome()
            }
        }
    }
}
