//! Circuit breaker guarding a single unreliable operation.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: operation assumed down, calls fail fast
//! - Half-Open: probing whether the operation recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= failure_threshold
//! Open → Half-Open: first admission attempt at/after opened_until
//! Half-Open → Closed: consecutive_successes >= success_threshold
//! Half-Open → Open: any failure
//! Any → Closed: reset()
//! ```
//!
//! # Design Decisions
//! - One mutex guards all counters and the state; it is held only for
//!   bookkeeping, never across the guarded operation
//! - Open → Half-Open is evaluated lazily at admission, no background timer
//! - Exactly one invocation of the operation per `execute`
//! - Errors from the operation are returned as-is inside `BreakerError::Operation`

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::validation::validate_breaker;
use crate::config::{BreakerConfig, ConfigError};
use crate::observability::metrics::{self, CallOutcome};
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::error::{BreakerError, CircuitOpenError};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// Calls are admitted tentatively to test recovery.
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a breaker, taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    /// Cooldown left while Open; zero once it has elapsed but no call has arrived yet.
    pub open_remaining: Option<Duration>,
    /// Number of times the circuit has opened.
    pub times_opened: u64,
    /// Number of Open → Half-Open promotions.
    pub half_open_promotions: u64,
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admitted,
    /// Admitted, and this call moved the circuit from Open to Half-Open.
    Promoted,
    Rejected { remaining: Duration },
}

/// Mutable breaker state. Only ever touched with the owning mutex held.
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_until: Option<Instant>,
    times_opened: u64,
    half_open_promotions: u64,
    /// Bumped on every state change; orders announcements made after unlocking.
    transitions: u64,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            opened_until: None,
            times_opened: 0,
            half_open_promotions: 0,
            transitions: 0,
        }
    }
}

impl BreakerState {
    fn admit(&mut self, now: Instant) -> Admission {
        if self.state != CircuitState::Open {
            return Admission::Admitted;
        }

        match self.opened_until {
            Some(until) if now < until => Admission::Rejected {
                remaining: until - now,
            },
            _ => {
                self.state = CircuitState::HalfOpen;
                self.consecutive_successes = 0;
                self.opened_until = None;
                self.half_open_promotions += 1;
                self.transitions += 1;
                Admission::Promoted
            }
        }
    }

    /// Returns the new state if this success caused a transition.
    fn record_success(&mut self, success_threshold: u32) -> Option<CircuitState> {
        self.consecutive_failures = 0;

        if self.state != CircuitState::HalfOpen {
            return None;
        }

        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        if self.consecutive_successes >= success_threshold {
            self.state = CircuitState::Closed;
            self.consecutive_successes = 0;
            self.transitions += 1;
            return Some(CircuitState::Closed);
        }
        None
    }

    /// Returns the new state if this failure caused a transition.
    fn record_failure(
        &mut self,
        failure_threshold: u32,
        now: Instant,
        timeout: Duration,
    ) -> Option<CircuitState> {
        self.consecutive_successes = 0;

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.consecutive_failures >= failure_threshold {
                    self.open(now + timeout);
                    return Some(CircuitState::Open);
                }
                None
            }
            CircuitState::HalfOpen => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.open(now + timeout);
                Some(CircuitState::Open)
            }
            // Outcome of a call admitted before the circuit opened.
            CircuitState::Open => None,
        }
    }

    fn open(&mut self, until: Instant) {
        self.state = CircuitState::Open;
        self.consecutive_successes = 0;
        self.opened_until = Some(until);
        self.times_opened += 1;
        self.transitions += 1;
    }

    fn reset(&mut self) -> Option<CircuitState> {
        let previous = self.state;
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.consecutive_successes = 0;
        self.opened_until = None;
        if previous == CircuitState::Closed {
            return None;
        }
        self.transitions += 1;
        Some(CircuitState::Closed)
    }
}

/// A thread-safe circuit breaker.
///
/// Share it between tasks behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerState>,
    /// Sequence number of the transition last written to the state gauge.
    published: Mutex<u64>,
}

impl CircuitBreaker {
    /// Create a breaker on the system clock.
    pub fn new(config: BreakerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a breaker reading time from `clock`.
    pub fn with_clock(config: BreakerConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        validate_breaker(&config).map_err(ConfigError::Validation)?;

        tracing::debug!(
            breaker = %config.name,
            failure_threshold = config.failure_threshold,
            success_threshold = config.success_threshold,
            timeout_ms = config.timeout_ms,
            "Circuit breaker created"
        );
        metrics::record_state(&config.name, CircuitState::Closed);

        Ok(Self {
            config,
            clock,
            inner: Mutex::new(BreakerState::default()),
            published: Mutex::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state. Does not promote an expired Open circuit.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let st = self.lock();
        let open_remaining = match (st.state, st.opened_until) {
            (CircuitState::Open, Some(until)) => {
                Some(until.saturating_duration_since(self.clock.now()))
            }
            _ => None,
        };

        BreakerSnapshot {
            name: self.config.name.clone(),
            state: st.state,
            consecutive_failures: st.consecutive_failures,
            consecutive_successes: st.consecutive_successes,
            open_remaining,
            times_opened: st.times_opened,
            half_open_promotions: st.half_open_promotions,
        }
    }

    /// Force the circuit Closed and clear both counters.
    pub fn reset(&self) {
        let transition = {
            let mut st = self.lock();
            st.reset().map(|to| (to, st.transitions))
        };
        tracing::debug!(breaker = %self.config.name, "Circuit breaker reset");
        if let Some((to, seq)) = transition {
            self.announce(to, seq);
        }
    }

    /// Run `operation` once if the breaker admits it, and record the outcome.
    ///
    /// Returns `BreakerError::Open` without calling `operation` while the
    /// circuit is open and its cooldown has not elapsed.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.acquire()?;

        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(BreakerError::Operation(err))
            }
        }
    }

    fn acquire(&self) -> Result<(), CircuitOpenError> {
        let (admission, seq) = {
            let mut st = self.lock();
            let admission = st.admit(self.clock.now());
            (admission, st.transitions)
        };

        match admission {
            Admission::Admitted => Ok(()),
            Admission::Promoted => {
                self.announce(CircuitState::HalfOpen, seq);
                Ok(())
            }
            Admission::Rejected { remaining } => {
                tracing::debug!(
                    breaker = %self.config.name,
                    remaining_ms = remaining.as_millis() as u64,
                    "Call rejected, circuit open"
                );
                metrics::record_call(&self.config.name, CallOutcome::Rejected);
                Err(CircuitOpenError {
                    breaker: self.config.name.clone(),
                    remaining,
                })
            }
        }
    }

    fn on_success(&self) {
        let transition = {
            let mut st = self.lock();
            st.record_success(self.config.success_threshold)
                .map(|to| (to, st.transitions))
        };

        metrics::record_call(&self.config.name, CallOutcome::Success);
        if let Some((to, seq)) = transition {
            self.announce(to, seq);
        }
    }

    fn on_failure(&self) {
        let transition = {
            let mut st = self.lock();
            let now = self.clock.now();
            st.record_failure(self.config.failure_threshold, now, self.config.timeout())
                .map(|to| (to, st.transitions))
        };

        metrics::record_call(&self.config.name, CallOutcome::Failure);
        if let Some((to, seq)) = transition {
            self.announce(to, seq);
        }
    }

    /// Log and count transition `seq`, and publish it to the state gauge
    /// unless a later transition already has been.
    fn announce(&self, to: CircuitState, seq: u64) {
        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.config.name,
                cooldown_ms = self.config.timeout_ms,
                "Circuit breaker opened"
            ),
            CircuitState::HalfOpen => tracing::info!(
                breaker = %self.config.name,
                "Circuit breaker half-open, probing"
            ),
            CircuitState::Closed => tracing::info!(
                breaker = %self.config.name,
                "Circuit breaker closed"
            ),
        }
        metrics::record_transition(&self.config.name, to);

        let mut published = self.published.lock().unwrap_or_else(|e| e.into_inner());
        if seq > *published {
            *published = seq;
            metrics::record_state(&self.config.name, to);
        }
    }

    // Mutations never leave the state half-written, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
