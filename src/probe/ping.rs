//! ICMP echo probe.
//!
//! A host is alive when it answers one echo request within the timeout.
//! There is no protocol layer, so this probe never reports an auth failure.
//! Sending ICMP needs either raw-socket privileges or an unprivileged ping
//! socket (`net.ipv4.ping_group_range` on Linux); without one every host
//! comes back as a network failure.

use super::{Outcome, Probe, ProbeKind};
use crate::error::{AttemptResult, ProbeError};
use crate::types::Target;
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::SurgeError;
use tokio::time::timeout;
use tracing::debug;

const PAYLOAD: [u8; 56] = [0; 56];

/// ICMP echo probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct PingProbe;

impl PingProbe {
    /// Create a new ping probe.
    pub fn new() -> Self {
        Self
    }

    async fn attempt(&self, addr: IpAddr, limit: Duration) -> AttemptResult<Duration> {
        match timeout(limit, surge_ping::ping(addr, &PAYLOAD)).await {
            Ok(Ok((_reply, rtt))) => Ok(rtt),
            Ok(Err(e)) => Err(classify_ping_error(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

fn classify_ping_error(err: SurgeError) -> ProbeError {
    match err {
        SurgeError::Timeout { .. } => ProbeError::Timeout,
        SurgeError::IOError(e) => ProbeError::from_connect(e),
        other => ProbeError::ConnectionFailed(other.to_string()),
    }
}

#[async_trait]
impl Probe for PingProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Ping
    }

    async fn probe(&self, target: &Target, timeout: Duration) -> Outcome {
        let addr = IpAddr::V4(target.addr());

        match self.attempt(addr, timeout).await {
            Ok(rtt) => {
                debug!(host = %addr, rtt_ms = rtt.as_millis() as u64, "echo reply");
                Outcome::Success
            }
            Err(e) => {
                debug!(host = %addr, error = %e, "no echo reply");
                e.outcome()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::Ipv4Addr;

    #[test]
    fn test_errors_are_network_failures() {
        let denied = classify_ping_error(SurgeError::IOError(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )));
        assert_eq!(denied.outcome(), Outcome::NetworkFailure);

        let refused = classify_ping_error(SurgeError::IOError(io::Error::from(
            io::ErrorKind::ConnectionRefused,
        )));
        assert!(matches!(refused, ProbeError::ConnectionRefused));
    }

    #[tokio::test]
    async fn test_unanswered_address_is_network_failure() {
        // TEST-NET-1 is never routed, so the echo either times out or
        // cannot be sent at all. Both are network failures.
        let target = Target::host(Ipv4Addr::new(192, 0, 2, 1));
        let outcome = PingProbe::new()
            .probe(&target, Duration::from_millis(200))
            .await;
        assert_eq!(outcome, Outcome::NetworkFailure);
    }
}
