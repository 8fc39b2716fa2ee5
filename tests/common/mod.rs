//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use circuit_guard::config::ObservabilityConfig;
use circuit_guard::observability::logging::init_logging;
use circuit_guard::{BreakerConfig, CircuitBreaker, ManualClock};

/// Error returned by [`FlakyService`] when it is failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDown(pub usize);

/// A fake dependency that counts invocations and fails on demand.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FlakyService {
    calls: AtomicUsize,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl FlakyService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// One invocation; returns the call number on success.
    pub async fn call(&self) -> Result<usize, ServiceDown> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            Err(ServiceDown(n))
        } else {
            Ok(n)
        }
    }

    /// Like [`FlakyService::call`], but takes `delay` to respond.
    pub async fn slow_call(&self, delay: Duration) -> Result<usize, ServiceDown> {
        tokio::time::sleep(delay).await;
        self.call().await
    }
}

/// Build a breaker on a manual clock, with logging enabled.
#[allow(dead_code)]
pub fn breaker(
    failure_threshold: u32,
    success_threshold: u32,
    timeout_ms: u64,
) -> (Arc<CircuitBreaker>, Arc<ManualClock>) {
    init_logging(&ObservabilityConfig {
        log_level: "debug".into(),
        json_logs: false,
    });

    let clock = Arc::new(ManualClock::new());
    let config = BreakerConfig {
        name: "upstream".into(),
        failure_threshold,
        success_threshold,
        timeout_ms,
    };
    let cb = CircuitBreaker::with_clock(config, clock.clone()).expect("valid breaker config");
    (Arc::new(cb), clock)
}
