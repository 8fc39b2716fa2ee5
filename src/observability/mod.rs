//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CircuitBreaker state changes and call outcomes:
//!     → tracing events (target `circuit_guard`, field `breaker`)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber, or the host application's own
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Every event carries the breaker name
//! - Nothing is emitted while the breaker lock is held

pub mod logging;
pub mod metrics;
