//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → BreakerRegistry / CircuitBreaker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a breaker is built from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Breakers re-validate at construction, so hand-built configs fail fast too

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BreakerConfig;
pub use schema::GuardConfig;
pub use schema::ObservabilityConfig;
pub use validation::ValidationError;
