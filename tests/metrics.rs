//! Metrics emitted by breakers, read back through a debugging recorder.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use circuit_guard::observability::metrics::state_value;
use circuit_guard::{BreakerConfig, CircuitBreaker, CircuitState, ManualClock};
use futures_util::future::join_all;
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

mod common;

use common::ServiceDown;

/// The process-wide recorder; every test uses its own breaker name.
fn snapshotter() -> &'static Snapshotter {
    static SNAPSHOTTER: OnceLock<Snapshotter> = OnceLock::new();
    SNAPSHOTTER.get_or_init(|| {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        recorder.install().expect("recorder already installed");
        snapshotter
    })
}

/// Metric values for one breaker, keyed by name and the non-breaker label.
struct Recorded(Vec<(String, Vec<(String, String)>, DebugValue)>);

impl Recorded {
    fn take(breaker: &str) -> Self {
        let entries = snapshotter()
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| {
                let key = key.key();
                let labels: Vec<(String, String)> = key
                    .labels()
                    .map(|l| (l.key().to_string(), l.value().to_string()))
                    .collect();
                labels
                    .iter()
                    .any(|(k, v)| k == "breaker" && v == breaker)
                    .then(|| (key.name().to_string(), labels, value))
            })
            .collect();
        Self(entries)
    }

    fn counter(&self, name: &str, label: (&str, &str)) -> u64 {
        self.0
            .iter()
            .find(|(n, labels, _)| {
                n == name && labels.iter().any(|(k, v)| k == label.0 && v == label.1)
            })
            .map(|(_, _, value)| match value {
                DebugValue::Counter(c) => *c,
                other => panic!("{} is not a counter: {:?}", name, other),
            })
            .unwrap_or(0)
    }

    fn state_gauge(&self) -> f64 {
        self.0
            .iter()
            .find(|(n, _, _)| n == "breaker_state")
            .map(|(_, _, value)| match value {
                DebugValue::Gauge(g) => g.0,
                other => panic!("breaker_state is not a gauge: {:?}", other),
            })
            .expect("breaker_state gauge recorded")
    }
}

fn breaker(
    name: &str,
    failure_threshold: u32,
    success_threshold: u32,
    timeout_ms: u64,
) -> (Arc<CircuitBreaker>, Arc<ManualClock>) {
    snapshotter();
    let clock = Arc::new(ManualClock::new());
    let config = BreakerConfig {
        name: name.into(),
        failure_threshold,
        success_threshold,
        timeout_ms,
    };
    let cb = CircuitBreaker::with_clock(config, clock.clone()).unwrap();
    (Arc::new(cb), clock)
}

#[tokio::test]
async fn test_full_cycle_is_counted() {
    let (cb, clock) = breaker("metrics_cycle", 1, 1, 1000);

    let recorded = Recorded::take("metrics_cycle");
    assert_eq!(recorded.state_gauge(), 0.0);

    let _ = cb.execute(|| async { Err::<(), _>(ServiceDown(1)) }).await;
    assert_eq!(Recorded::take("metrics_cycle").state_gauge(), 2.0);

    clock.advance(Duration::from_millis(500));
    assert!(cb
        .execute(|| async { Ok::<_, ServiceDown>(()) })
        .await
        .unwrap_err()
        .is_open());

    clock.advance(Duration::from_millis(500));
    cb.execute(|| async { Ok::<_, ServiceDown>(()) }).await.unwrap();
    assert_eq!(cb.state(), CircuitState::Closed);

    let recorded = Recorded::take("metrics_cycle");
    assert_eq!(recorded.counter("breaker_calls_total", ("outcome", "failure")), 1);
    assert_eq!(recorded.counter("breaker_calls_total", ("outcome", "rejected")), 1);
    assert_eq!(recorded.counter("breaker_calls_total", ("outcome", "success")), 1);
    assert_eq!(recorded.counter("breaker_transitions_total", ("to", "open")), 1);
    assert_eq!(recorded.counter("breaker_transitions_total", ("to", "half_open")), 1);
    assert_eq!(recorded.counter("breaker_transitions_total", ("to", "closed")), 1);
    assert_eq!(recorded.state_gauge(), 0.0);
}

#[tokio::test]
async fn test_reset_updates_gauge() {
    let (cb, _clock) = breaker("metrics_reset", 1, 1, 60_000);
    let _ = cb.execute(|| async { Err::<(), _>(ServiceDown(1)) }).await;
    assert_eq!(Recorded::take("metrics_reset").state_gauge(), 2.0);

    cb.reset();
    let recorded = Recorded::take("metrics_reset");
    assert_eq!(recorded.state_gauge(), 0.0);
    assert_eq!(recorded.counter("breaker_transitions_total", ("to", "closed")), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gauge_tracks_state_under_concurrent_transitions() {
    let (cb, clock) = breaker("metrics_race", 1, 1, 5);

    for round in 0..20 {
        let handles: Vec<_> = (0..16usize)
            .map(|i| {
                let cb = cb.clone();
                let clock = clock.clone();
                tokio::spawn(async move {
                    if i % 3 == 0 {
                        clock.advance(Duration::from_millis(5));
                    }
                    cb.execute(|| async move {
                        tokio::task::yield_now().await;
                        if (i + round) % 2 == 0 {
                            Err(ServiceDown(i))
                        } else {
                            Ok(i)
                        }
                    })
                    .await
                })
            })
            .collect();

        for result in join_all(handles).await {
            let _ = result.unwrap();
        }

        assert_eq!(
            Recorded::take("metrics_race").state_gauge(),
            state_value(cb.state()),
            "gauge diverged from state in round {}",
            round
        );
    }
}
