//! Error types for lanprobe.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-target failures
//! are [`ProbeError`]s and never leave a probe: they are folded into an
//! [`Outcome`] by [`ProbeError::outcome`]. Everything else aborts a run.

use crate::probe::Outcome;
use crate::types::{AddressError, PortError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single probe attempt against one target.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("host unreachable")]
    HostUnreachable,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("protocol handshake failed: {0}")]
    Handshake(String),

    #[error("authentication rejected")]
    AuthRejected,

    #[error("service identity mismatch: expected {expected}, got {actual}")]
    IdentityMismatch { expected: String, actual: String },

    #[error("response body unreadable: {0}")]
    UnreadableBody(String),
}

impl ProbeError {
    /// Classify this failure.
    ///
    /// Anything that kept the transport from being established is a network
    /// failure; anything that happened on an established transport is an
    /// authorization failure. Timeouts count as network failures.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Timeout
            | Self::ConnectionRefused
            | Self::NetworkUnreachable(_)
            | Self::HostUnreachable
            | Self::ConnectionFailed(_) => Outcome::NetworkFailure,
            Self::Handshake(_)
            | Self::AuthRejected
            | Self::IdentityMismatch { .. }
            | Self::UnreadableBody(_) => Outcome::AuthFailure,
        }
    }

    /// Map an I/O error raised while dialing into a transport failure.
    pub fn from_connect(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            ErrorKind::TimedOut => Self::Timeout,
            _ => {
                let msg = err.to_string().to_lowercase();
                if msg.contains("unreachable") {
                    if msg.contains("host") {
                        Self::HostUnreachable
                    } else {
                        Self::NetworkUnreachable(err.to_string())
                    }
                } else {
                    Self::ConnectionFailed(err.to_string())
                }
            }
        }
    }
}

/// Configuration errors. These abort the whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("unreadable key material at {path}: {reason}")]
    KeyMaterial { path: PathBuf, reason: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Errors surfaced by the command layer.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for probe attempts.
pub type AttemptResult<T> = Result<T, ProbeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;
