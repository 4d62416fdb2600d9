//! Retry-until-success mode for a single target.
//!
//! Bypasses the worker pool: one target is probed over and over, with a
//! fixed pause between attempts, until it succeeds or the scan is
//! cancelled. There is no attempt limit.

use super::EngineConfig;
use crate::probe::{Outcome, ProbeResult, SharedProbe};
use crate::types::Target;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Single-target retry loop.
pub struct LoopRetrier {
    probe: SharedProbe,
    timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
}

impl LoopRetrier {
    /// Create a retrier using the engine's timeout and retry interval.
    pub fn new(config: &EngineConfig, probe: SharedProbe, cancel: CancellationToken) -> Self {
        Self {
            probe,
            timeout: config.probe_timeout,
            interval: config.retry_interval,
            cancel,
        }
    }

    /// Probe `target` until it succeeds or the scan is cancelled.
    ///
    /// `report` sees every decided attempt, failures included; filtering is
    /// up to the caller. Returns the successful result, or `None` when
    /// cancelled.
    pub async fn run<F>(&self, target: Target, mut report: F) -> Option<ProbeResult>
    where
        F: FnMut(&ProbeResult),
    {
        let mut attempt = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            attempt += 1;
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Outcome::Cancelled,
                outcome = self.probe.probe(&target, self.timeout) => outcome,
            };
            if !outcome.is_decided() || self.cancel.is_cancelled() {
                debug!(host = %target, attempt, "loop cancelled during attempt");
                return None;
            }

            let result = ProbeResult::new(target, outcome);
            report(&result);

            if outcome == Outcome::Success {
                info!(host = %target, attempt, "target accepted");
                return Some(result);
            }

            debug!(host = %target, attempt, %outcome, "retrying");
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
