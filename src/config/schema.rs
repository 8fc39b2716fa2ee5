//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field has a default so a minimal file (or none at all) is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration: default breaker settings plus named overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Settings applied to breakers created on demand.
    pub defaults: BreakerConfig,

    /// Explicitly configured breakers, created eagerly.
    pub breakers: Vec<BreakerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Tunables for a single breaker. Immutable once a breaker is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker identifier for logging/metrics.
    pub name: String,

    /// Consecutive failures in Closed that open the circuit.
    pub failure_threshold: u32,

    /// Consecutive successes in HalfOpen that close the circuit.
    pub success_threshold: u32,

    /// Cooldown applied each time the circuit opens, in milliseconds.
    pub timeout_ms: u64,
}

impl BreakerConfig {
    /// Build a config with the given name and the default tunables.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Cooldown as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            failure_threshold: 5,
            success_threshold: 2,
            timeout_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
