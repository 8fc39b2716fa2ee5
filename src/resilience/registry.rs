//! Named breakers sharing one clock.
//!
//! # Responsibilities
//! - Build the breakers listed in configuration up front
//! - Create breakers on demand from the default tunables
//! - Expose snapshots for status reporting
//!
//! # Design Decisions
//! - One breaker per protected dependency, not a global one
//! - Breakers are handed out as `Arc` so callers can keep them past a lookup

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::validation::validate_config;
use crate::config::{BreakerConfig, ConfigError, GuardConfig};
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::clock::{Clock, SystemClock};

/// A concurrent map of breaker name to breaker.
#[derive(Debug)]
pub struct BreakerRegistry {
    defaults: BreakerConfig,
    clock: Arc<dyn Clock>,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Build a registry on the system clock.
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &GuardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let breakers = DashMap::new();
        for breaker in &config.breakers {
            let cb = CircuitBreaker::with_clock(breaker.clone(), clock.clone())?;
            breakers.insert(breaker.name.clone(), Arc::new(cb));
        }

        tracing::info!(breakers = breakers.len(), "Breaker registry initialized");

        Ok(Self {
            defaults: config.defaults.clone(),
            clock,
            breakers,
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|r| r.value().clone())
    }

    /// Look up `name`, creating it from the defaults if it does not exist.
    pub fn get_or_create(&self, name: &str) -> Result<Arc<CircuitBreaker>, ConfigError> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        match self.breakers.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let config = BreakerConfig {
                    name: name.to_string(),
                    ..self.defaults.clone()
                };
                let cb = Arc::new(CircuitBreaker::with_clock(config, self.clock.clone())?);
                entry.insert(cb.clone());
                Ok(cb)
            }
        }
    }

    /// Snapshots of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<_> = self.breakers.iter().map(|r| r.value().snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Force every breaker Closed.
    pub fn reset_all(&self) {
        for r in self.breakers.iter() {
            r.value().reset();
        }
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}
