//! Circuit breaker for guarding unreliable asynchronous operations.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller ──execute(op)──▶ CircuitBreaker ──admit?──┬── no ──▶ BreakerError::Open
//!                                   │                  │
//!                                   │                  └── yes ─▶ op().await (lock released)
//!                                   │                                  │
//!                                   ◀────── record success/failure ────┘
//!
//!     Cross-cutting: config (TOML + validation), observability (tracing + metrics)
//! ```

pub mod config;
pub mod observability;
pub mod resilience;

pub use config::{BreakerConfig, ConfigError, GuardConfig};
pub use resilience::{
    BreakerError, BreakerRegistry, BreakerSnapshot, CircuitBreaker, CircuitOpenError,
    CircuitState, Clock, ManualClock, SystemClock,
};
