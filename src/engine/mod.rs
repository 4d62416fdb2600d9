//! Bounded-concurrency probe engine.
//!
//! A single producer feeds targets into a bounded queue. A fixed pool of
//! workers pulls from the queue, probes each target, and routes the
//! outcome to the [`ResultCollector`]. Every queue and channel operation
//! races against the cancellation token, and so does every probe: a
//! cancelled scan abandons probes in flight instead of waiting on them.
//!
//! Teardown order: workers are joined, the outcome senders are dropped,
//! then the collector drains and returns.

pub mod collector;
pub mod retry;
pub mod sort;

use crate::probe::{Outcome, ProbeResult, SharedProbe};
use crate::types::{AddressSpace, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use collector::{OutcomeSenders, ResultCollector, ResultSet};
pub use retry::LoopRetrier;
pub use sort::sort_by_last_octet;

/// Worker count used when the configured concurrency is zero.
pub const DEFAULT_CONCURRENCY: usize = 500;

/// Default bound on a probe's transport establishment.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default pause between loop-mode attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

const QUEUE_DEPTH: usize = 100;
const OUTCOME_BUFFER: usize = 100;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of live workers. Zero means [`DEFAULT_CONCURRENCY`].
    pub concurrency: usize,
    /// Timeout handed to every probe.
    pub probe_timeout: Duration,
    /// Pause between attempts in loop mode.
    pub retry_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Set the worker bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the loop-mode retry interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Worker bound with zero normalized to the default.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            DEFAULT_CONCURRENCY
        } else {
            self.concurrency
        }
    }
}

/// Incremental progress pushed to a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// A target was decided.
    Probed(ProbeResult),
    /// The scan is over; no further events follow.
    Finished,
}

/// Sender half of the progress stream.
pub type EventSender = mpsc::UnboundedSender<ScanEvent>;

/// Protocol-agnostic worker pool.
pub struct ProbeEngine {
    config: EngineConfig,
    probe: SharedProbe,
    cancel: CancellationToken,
    events: Option<EventSender>,
}

impl ProbeEngine {
    /// Create an engine around `probe`.
    pub fn new(config: EngineConfig, probe: SharedProbe, cancel: CancellationToken) -> Self {
        Self {
            config,
            probe,
            cancel,
            events: None,
        }
    }

    /// Push a [`ScanEvent`] for every decided target, then `Finished`.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Probe every address of `space`.
    pub async fn run(&self, space: &AddressSpace) -> ResultSet {
        self.run_targets(space.iter()).await
    }

    /// Probe an arbitrary target sequence.
    ///
    /// Returns the buckets unsorted; completion order is arbitrary.
    pub async fn run_targets<I>(&self, targets: I) -> ResultSet
    where
        I: IntoIterator<Item = Target>,
        I::IntoIter: Send + 'static,
    {
        let targets = targets.into_iter();
        let workers = worker_count(self.config.effective_concurrency(), targets.size_hint());

        info!(
            probe = %self.probe.kind(),
            workers,
            timeout_ms = self.config.probe_timeout.as_millis() as u64,
            "starting scan"
        );

        // The collector starts first so no early result is lost.
        let (senders, collector) = ResultCollector::spawn(OUTCOME_BUFFER);

        let (task_tx, task_rx) = mpsc::channel(QUEUE_DEPTH);
        let ctx = Arc::new(WorkerContext {
            queue: Mutex::new(task_rx),
            probe: Arc::clone(&self.probe),
            timeout: self.config.probe_timeout,
            senders,
            events: self.events.clone(),
            cancel: self.cancel.clone(),
        });

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(work(id, Arc::clone(&ctx)));
        }

        let producer = tokio::spawn(produce(targets, task_tx, self.cancel.clone()));

        let mut probed = 0usize;
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(count) => probed += count,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => debug!(error = %e, "worker aborted"),
            }
        }

        // Dropping the last context closes the outcome channels and the
        // queue receiver, which also unblocks a producer with no workers left.
        drop(ctx);
        if let Err(e) = producer.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }

        let results = collector.finish().await;

        if let Some(events) = &self.events {
            let _ = events.send(ScanEvent::Finished);
        }

        info!(
            probed,
            ok = results.ok.len(),
            auth_failed = results.auth_failed.len(),
            network_failed = results.network_failed.len(),
            cancelled = self.cancel.is_cancelled(),
            "scan finished"
        );
        results
    }
}

/// State shared by all workers of one run.
struct WorkerContext {
    queue: Mutex<mpsc::Receiver<Target>>,
    probe: SharedProbe,
    timeout: Duration,
    senders: OutcomeSenders,
    events: Option<EventSender>,
    cancel: CancellationToken,
}

impl WorkerContext {
    async fn next_task(&self) -> Option<Target> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            next = async { self.queue.lock().await.recv().await } => next,
        }
    }

    /// Probe `target`, giving up as soon as the scan is cancelled.
    ///
    /// A probe stuck past its dial (a silent SSH server, say) is dropped
    /// rather than awaited.
    async fn attempt(&self, target: &Target) -> Outcome {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Outcome::Cancelled,
            outcome = self.probe.probe(target, self.timeout) => outcome,
        }
    }

    /// Route a decided result. Returns false once the scan is cancelled.
    async fn emit(&self, result: ProbeResult) -> bool {
        let Some(tx) = self.senders.for_outcome(result.outcome) else {
            return false;
        };

        let delivered = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = tx.send(result.target) => sent.is_ok(),
        };

        if delivered {
            if let Some(events) = &self.events {
                let _ = events.send(ScanEvent::Probed(result));
            }
        }
        delivered
    }
}

fn worker_count(bound: usize, size_hint: (usize, Option<usize>)) -> usize {
    match size_hint.1 {
        Some(upper) => bound.min(upper),
        None => bound,
    }
}

async fn produce<I>(targets: I, queue: mpsc::Sender<Target>, cancel: CancellationToken)
where
    I: Iterator<Item = Target>,
{
    let mut queued = 0usize;
    for target in targets {
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(queued, "cancelled, stopping production");
                break;
            }
            sent = queue.send(target) => sent,
        };
        if sent.is_err() {
            debug!(queued, "no workers left, stopping production");
            break;
        }
        queued += 1;
    }
    // Dropping the sender closes the queue; workers drain what is left.
}

async fn work(id: usize, ctx: Arc<WorkerContext>) -> usize {
    let mut probed = 0usize;

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let Some(target) = ctx.next_task().await else {
            break;
        };

        let outcome = ctx.attempt(&target).await;
        probed += 1;

        // A probe that completes after cancellation is dropped as well.
        if !outcome.is_decided() || ctx.cancel.is_cancelled() {
            debug!(worker = id, host = %target, "discarding outcome after cancellation");
            break;
        }

        debug!(worker = id, host = %target, %outcome, "probed");
        if !ctx.emit(ProbeResult::new(target, outcome)).await {
            break;
        }
    }

    probed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Probe, ProbeKind};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake probe with scripted outcomes, latency and bookkeeping.
    struct ScriptedProbe {
        outcome_for: fn(u8) -> Outcome,
        latency: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(outcome_for: fn(u8) -> Outcome, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcome_for,
                latency,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        fn kind(&self) -> ProbeKind {
            ProbeKind::Tcp
        }

        async fn probe(&self, target: &Target, _timeout: Duration) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if self.latency.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.latency).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            (self.outcome_for)(target.last_octet())
        }
    }

    fn scenario(last: u8) -> Outcome {
        match last {
            1 => Outcome::AuthFailure,
            3 => Outcome::Success,
            _ => Outcome::NetworkFailure,
        }
    }

    fn by_remainder(last: u8) -> Outcome {
        match last % 3 {
            0 => Outcome::Success,
            1 => Outcome::AuthFailure,
            _ => Outcome::NetworkFailure,
        }
    }

    fn always_network(_: u8) -> Outcome {
        Outcome::NetworkFailure
    }

    fn lasts(targets: &[Target]) -> Vec<u8> {
        targets.iter().map(Target::last_octet).collect()
    }

    fn engine(concurrency: usize, probe: Arc<ScriptedProbe>, cancel: CancellationToken) -> ProbeEngine {
        ProbeEngine::new(
            EngineConfig::default().with_concurrency(concurrency),
            probe,
            cancel,
        )
    }

    #[tokio::test]
    async fn test_scenario_buckets() {
        let probe = ScriptedProbe::new(scenario, Duration::ZERO);
        let results = engine(4, probe, CancellationToken::new())
            .run(&AddressSpace::lan(3, 1, 5))
            .await
            .sorted();

        assert_eq!(lasts(&results.ok), vec![3]);
        assert_eq!(lasts(&results.auth_failed), vec![1]);
        assert_eq!(lasts(&results.network_failed), vec![2, 4, 5]);
    }

    #[tokio::test]
    async fn test_every_target_decided_once() {
        let probe = ScriptedProbe::new(by_remainder, Duration::ZERO);
        let space = AddressSpace::lan(3, 0, 255);

        let results = engine(16, Arc::clone(&probe), CancellationToken::new())
            .run(&space)
            .await
            .sorted();

        assert_eq!(results.total(), space.len());
        assert_eq!(probe.calls.load(Ordering::SeqCst), space.len());

        let mut seen = HashSet::new();
        for bucket in [&results.ok, &results.auth_failed, &results.network_failed] {
            for target in bucket.iter() {
                assert!(seen.insert(*target), "{} decided twice", target);
            }
            assert!(bucket.windows(2).all(|w| w[0].last_octet() <= w[1].last_octet()));
        }
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let probe = ScriptedProbe::new(always_network, Duration::from_millis(5));
        let results = engine(4, Arc::clone(&probe), CancellationToken::new())
            .run(&AddressSpace::lan(3, 1, 40))
            .await;

        assert_eq!(results.network_failed.len(), 40);
        let max = probe.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {} concurrent probes", max);
        assert!(max >= 1);
    }

    #[test]
    fn test_zero_concurrency_uses_default() {
        let config = EngineConfig::default().with_concurrency(0);
        assert_eq!(config.effective_concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(EngineConfig::default().with_concurrency(7).effective_concurrency(), 7);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_scans() {
        let probe = ScriptedProbe::new(scenario, Duration::ZERO);
        let results = engine(0, Arc::clone(&probe), CancellationToken::new())
            .run(&AddressSpace::lan(3, 1, 5))
            .await;

        assert_eq!(results.total(), 5);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_worker_count_never_exceeds_targets() {
        assert_eq!(worker_count(500, (5, Some(5))), 5);
        assert_eq!(worker_count(4, (256, Some(256))), 4);
        assert_eq!(worker_count(8, (0, None)), 8);
        assert_eq!(worker_count(500, (0, Some(0))), 0);
    }

    #[tokio::test]
    async fn test_empty_range() {
        let probe = ScriptedProbe::new(scenario, Duration::ZERO);
        let results = tokio::time::timeout(
            Duration::from_secs(5),
            engine(4, Arc::clone(&probe), CancellationToken::new()).run(&AddressSpace::lan(3, 10, 9)),
        )
        .await
        .expect("empty scan must not block");

        assert!(results.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let probe = ScriptedProbe::new(scenario, Duration::ZERO);
        let results = engine(4, Arc::clone(&probe), cancel)
            .run(&AddressSpace::lan(3, 1, 254))
            .await;

        assert!(results.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    /// Cancels the scan from inside the probe of one target.
    struct CancellingProbe {
        trigger: u8,
        cancel: CancellationToken,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Probe for CancellingProbe {
        fn kind(&self) -> ProbeKind {
            ProbeKind::Tcp
        }

        async fn probe(&self, target: &Target, _timeout: Duration) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if target.last_octet() == self.trigger {
                self.cancel.cancel();
            }
            Outcome::Success
        }
    }

    #[tokio::test]
    async fn test_cancelled_mid_scan_single_worker() {
        let cancel = CancellationToken::new();
        let probe = Arc::new(CancellingProbe {
            trigger: 3,
            cancel: cancel.clone(),
            calls: AtomicUsize::new(0),
        });

        let results = ProbeEngine::new(
            EngineConfig::default().with_concurrency(1),
            Arc::clone(&probe) as SharedProbe,
            cancel.clone(),
        )
        .run(&AddressSpace::lan(3, 1, 10))
        .await
        .sorted();

        // Targets 1 and 2 were decided; 3 was in flight when the scan was
        // cancelled and is dropped; nothing after it starts.
        assert_eq!(lasts(&results.ok), vec![1, 2]);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_during_slow_scan_terminates() {
        let cancel = CancellationToken::new();
        let probe = ScriptedProbe::new(always_network, Duration::from_millis(50));
        let engine = engine(2, Arc::clone(&probe), cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            trigger.cancel();
        });

        let space = AddressSpace::lan(3, 0, 255);
        let results = tokio::time::timeout(Duration::from_secs(5), engine.run(&space))
            .await
            .expect("cancelled scan must terminate");

        let calls = probe.calls.load(Ordering::SeqCst);
        assert!(calls < space.len());
        assert!(results.total() <= calls);
    }

    /// Never completes, like a server that accepts and then stays silent.
    struct HangingProbe {
        started: AtomicUsize,
    }

    #[async_trait]
    impl Probe for HangingProbe {
        fn kind(&self) -> ProbeKind {
            ProbeKind::Ssh
        }

        async fn probe(&self, _target: &Target, _timeout: Duration) -> Outcome {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_hung_probes() {
        let cancel = CancellationToken::new();
        let probe = Arc::new(HangingProbe {
            started: AtomicUsize::new(0),
        });
        let engine = ProbeEngine::new(
            EngineConfig::default().with_concurrency(4),
            Arc::clone(&probe) as SharedProbe,
            cancel.clone(),
        );

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let results = tokio::time::timeout(
            Duration::from_secs(5),
            engine.run(&AddressSpace::lan(3, 1, 20)),
        )
        .await
        .expect("cancelled scan must not wait on hung probes");

        assert!(results.is_empty());
        assert_eq!(probe.started.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_events_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let probe = ScriptedProbe::new(scenario, Duration::ZERO);
        let results = engine(3, probe, CancellationToken::new())
            .with_events(tx)
            .run(&AddressSpace::lan(3, 1, 5))
            .await;

        let mut probed = Vec::new();
        let mut finished = 0;
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::Probed(result) => {
                    assert_eq!(finished, 0, "event after Finished");
                    probed.push(result);
                }
                ScanEvent::Finished => finished += 1,
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(probed.len(), results.total());
        assert!(probed
            .iter()
            .any(|r| r.target.last_octet() == 3 && r.outcome == Outcome::Success));
    }
}
