//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a protected operation:
//!     → registry.rs (look up the breaker for this dependency)
//!     → circuit_breaker.rs (admit or reject, run once, record outcome)
//!     → clock.rs (cooldown deadlines)
//!     → error.rs (rejection vs. operation failure)
//! ```
//!
//! # Design Decisions
//! - The breaker only decides admission and tallies outcomes; retries,
//!   rate limiting and per-call deadlines belong to the caller
//! - Circuit breaker prevents cascading failures

pub mod circuit_breaker;
pub mod clock;
pub mod error;
pub mod registry;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BreakerError, CircuitOpenError};
pub use registry::BreakerRegistry;
