//! Probe abstraction.
//!
//! A probe makes one attempt against one [`Target`] and classifies the
//! attempt into an [`Outcome`]. The engine and the loop retrier only ever
//! see outcomes; transport errors stay inside the probe.

pub mod http;
pub mod key;
pub mod ping;
pub mod ssh;
pub mod tcp;

use crate::types::Target;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use http::HttpDetectProbe;
pub use key::KeyMaterialProvider;
pub use ping::PingProbe;
pub use ssh::{SshCredentials, SshProbe};
pub use tcp::TcpConnectProbe;

/// Classified result of one probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The transport connected and the protocol check passed.
    Success,
    /// The transport connected but the protocol rejected us.
    AuthFailure,
    /// The transport could not be established.
    NetworkFailure,
    /// The attempt was abandoned because the scan was cancelled.
    Cancelled,
}

impl Outcome {
    /// Outcomes that are stored in a result set.
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "ok"),
            Self::AuthFailure => write!(f, "auth error"),
            Self::NetworkFailure => write!(f, "network error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A target paired with the outcome of probing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub target: Target,
    pub outcome: Outcome,
}

impl ProbeResult {
    /// Create a new probe result.
    pub fn new(target: Target, outcome: Outcome) -> Self {
        Self { target, outcome }
    }
}

/// Which protocol a probe speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// SSH login attempt.
    Ssh,
    /// Plain TCP connect.
    Tcp,
    /// HTTP service fingerprint.
    Http,
    /// ICMP echo.
    Ping,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => write!(f, "SSH login"),
            Self::Tcp => write!(f, "TCP connect"),
            Self::Http => write!(f, "HTTP detect"),
            Self::Ping => write!(f, "ICMP echo"),
        }
    }
}

/// A single-target check.
///
/// Implementations must bound transport establishment by `timeout` and
/// must fold every failure into [`Outcome::AuthFailure`] or
/// [`Outcome::NetworkFailure`]. Any connection acquired during the attempt
/// is released before `probe` returns.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Protocol spoken by this probe.
    fn kind(&self) -> ProbeKind;

    /// Probe one target.
    async fn probe(&self, target: &Target, timeout: Duration) -> Outcome;
}

/// A probe shared between workers.
pub type SharedProbe = Arc<dyn Probe>;
