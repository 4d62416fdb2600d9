//! End-to-end engine behavior through the public API.

use async_trait::async_trait;
use lanprobe::engine::{EngineConfig, LoopRetrier, ProbeEngine, ScanEvent};
use lanprobe::probe::{Outcome, Probe, ProbeKind, SharedProbe};
use lanprobe::types::{AddressSpace, Target};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Classifies by last octet and records every target it sees.
struct OctetProbe {
    delay: Duration,
    seen: Mutex<Vec<Target>>,
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl OctetProbe {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            seen: Mutex::new(Vec::new()),
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Probe for OctetProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }

    async fn probe(&self, target: &Target, _timeout: Duration) -> Outcome {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        self.seen.lock().unwrap().push(*target);

        tokio::time::sleep(self.delay).await;
        self.live.fetch_sub(1, Ordering::SeqCst);

        match target.last_octet() % 3 {
            0 => Outcome::Success,
            1 => Outcome::AuthFailure,
            _ => Outcome::NetworkFailure,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn full_range_is_partitioned_and_sorted() {
    let probe = OctetProbe::new(Duration::from_millis(10));
    let engine = ProbeEngine::new(
        EngineConfig::default().with_concurrency(32),
        Arc::clone(&probe) as SharedProbe,
        CancellationToken::new(),
    );

    let space = AddressSpace::lan(3, 1, 254);
    let results = engine.run(&space).await.sorted();

    assert_eq!(results.total(), 254);
    assert!(probe.peak.load(Ordering::SeqCst) <= 32);

    let seen: HashSet<Target> = probe.seen.lock().unwrap().iter().copied().collect();
    assert_eq!(seen.len(), 254, "every address probed exactly once");

    for bucket in [&results.ok, &results.auth_failed, &results.network_failed] {
        let octets: Vec<u8> = bucket.iter().map(Target::last_octet).collect();
        let mut sorted = octets.clone();
        sorted.sort_unstable();
        assert_eq!(octets, sorted);
    }
    assert!(results.ok.iter().all(|t| t.last_octet() % 3 == 0));
}

#[tokio::test(start_paused = true)]
async fn cancellation_yields_partial_disjoint_results() {
    let probe = OctetProbe::new(Duration::from_millis(100));
    let cancel = CancellationToken::new();
    let engine = ProbeEngine::new(
        EngineConfig::default().with_concurrency(8),
        Arc::clone(&probe) as SharedProbe,
        cancel.clone(),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        trigger.cancel();
    });

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let results = engine
        .with_events(events_tx)
        .run(&AddressSpace::lan(3, 1, 254))
        .await;

    assert!(results.total() < 254);

    let mut all: Vec<Target> = results.ok.clone();
    all.extend(&results.auth_failed);
    all.extend(&results.network_failed);
    let unique: HashSet<Target> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len(), "no target in two buckets");

    let mut probed = 0;
    let mut finished = 0;
    while let Ok(event) = events_rx.try_recv() {
        match event {
            ScanEvent::Probed(_) => probed += 1,
            ScanEvent::Finished => finished += 1,
        }
    }
    assert_eq!(probed, results.total());
    assert_eq!(finished, 1);
}

#[tokio::test(start_paused = true)]
async fn loop_retrier_stops_on_first_success() {
    // Last octet 3 succeeds on the first attempt.
    let probe = OctetProbe::new(Duration::ZERO);
    let retrier = LoopRetrier::new(
        &EngineConfig::default(),
        Arc::clone(&probe) as SharedProbe,
        CancellationToken::new(),
    );

    let target = AddressSpace::lan(3, 3, 3).target(3);
    let result = retrier.run(target, |_| {}).await.unwrap();

    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(probe.seen.lock().unwrap().len(), 1);
}
