//! Error kinds surfaced by a guarded call.

use std::time::Duration;
use thiserror::Error;

/// The breaker refused the call; the operation was never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit breaker '{breaker}' is open, retry in {remaining:?}")]
pub struct CircuitOpenError {
    /// Name of the breaker that rejected the call.
    pub breaker: String,
    /// Cooldown left before the breaker will admit a probe.
    pub remaining: Duration,
}

/// Outcome of a failed `execute` call.
///
/// `Operation` holds the operation's own error exactly as it was returned.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Admission denied.
    #[error(transparent)]
    Open(#[from] CircuitOpenError),

    /// The guarded operation ran and failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// True when the breaker rejected the call without running it.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open(_))
    }

    /// The operation's error, if the operation ran.
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Open(_) => None,
        }
    }
}
