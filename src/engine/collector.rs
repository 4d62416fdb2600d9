//! Fan-in of classified targets into result buckets.
//!
//! Each decided outcome class has its own bounded channel. The collector
//! merges the three receivers into one stream that ends only once every
//! channel is closed and drained, so channels may close in any order and
//! nothing is lost or counted twice.

use super::sort::sort_by_last_octet;
use crate::probe::Outcome;
use crate::types::Target;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Targets grouped by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    #[serde(rename = "ok_list")]
    pub ok: Vec<Target>,
    #[serde(rename = "auth_err_list")]
    pub auth_failed: Vec<Target>,
    #[serde(rename = "network_err_list")]
    pub network_failed: Vec<Target>,
}

impl ResultSet {
    /// Append a target to the bucket for `outcome`.
    ///
    /// Cancelled outcomes are never stored.
    pub fn push(&mut self, outcome: Outcome, target: Target) {
        match outcome {
            Outcome::Success => self.ok.push(target),
            Outcome::AuthFailure => self.auth_failed.push(target),
            Outcome::NetworkFailure => self.network_failed.push(target),
            Outcome::Cancelled => {}
        }
    }

    /// The bucket for `outcome`.
    pub fn bucket(&self, outcome: Outcome) -> &[Target] {
        match outcome {
            Outcome::Success => &self.ok,
            Outcome::AuthFailure => &self.auth_failed,
            Outcome::NetworkFailure => &self.network_failed,
            Outcome::Cancelled => &[],
        }
    }

    /// Number of decided targets.
    pub fn total(&self) -> usize {
        self.ok.len() + self.auth_failed.len() + self.network_failed.len()
    }

    /// True when no target was decided.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sort every bucket by last octet.
    pub fn sort(&mut self) {
        sort_by_last_octet(&mut self.ok);
        sort_by_last_octet(&mut self.auth_failed);
        sort_by_last_octet(&mut self.network_failed);
    }

    /// Consume and return the sorted set.
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }
}

/// Sending halves of the outcome channels.
#[derive(Debug, Clone)]
pub struct OutcomeSenders {
    ok: mpsc::Sender<Target>,
    auth: mpsc::Sender<Target>,
    network: mpsc::Sender<Target>,
}

impl OutcomeSenders {
    /// The channel that carries `outcome`, if it is stored at all.
    pub fn for_outcome(&self, outcome: Outcome) -> Option<&mpsc::Sender<Target>> {
        match outcome {
            Outcome::Success => Some(&self.ok),
            Outcome::AuthFailure => Some(&self.auth),
            Outcome::NetworkFailure => Some(&self.network),
            Outcome::Cancelled => None,
        }
    }
}

/// Background task accumulating a [`ResultSet`].
pub struct ResultCollector {
    handle: JoinHandle<ResultSet>,
}

impl ResultCollector {
    /// Open the outcome channels and start draining them.
    ///
    /// The collector finishes once every clone of the returned senders has
    /// been dropped.
    pub fn spawn(buffer: usize) -> (OutcomeSenders, Self) {
        let (ok_tx, ok_rx) = mpsc::channel(buffer);
        let (auth_tx, auth_rx) = mpsc::channel(buffer);
        let (network_tx, network_rx) = mpsc::channel(buffer);

        let handle = tokio::spawn(collect(vec![
            tagged(Outcome::Success, ok_rx),
            tagged(Outcome::AuthFailure, auth_rx),
            tagged(Outcome::NetworkFailure, network_rx),
        ]));

        let senders = OutcomeSenders {
            ok: ok_tx,
            auth: auth_tx,
            network: network_tx,
        };
        (senders, Self { handle })
    }

    /// Wait for all channels to close and return the buckets.
    pub async fn finish(self) -> ResultSet {
        match self.handle.await {
            Ok(results) => results,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "result collector was aborted");
                ResultSet::default()
            }
        }
    }
}

fn tagged(outcome: Outcome, mut rx: mpsc::Receiver<Target>) -> BoxStream<'static, (Outcome, Target)> {
    stream::poll_fn(move |cx| rx.poll_recv(cx))
        .map(move |target| (outcome, target))
        .boxed()
}

async fn collect(streams: Vec<BoxStream<'static, (Outcome, Target)>>) -> ResultSet {
    let mut merged = stream::select_all(streams);
    let mut results = ResultSet::default();

    while let Some((outcome, target)) = merged.next().await {
        results.push(outcome, target);
    }

    debug!(decided = results.total(), "all outcome channels closed");
    results
}
