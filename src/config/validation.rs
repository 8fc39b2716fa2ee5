//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, timeout > 0)
//! - Detect duplicate breaker names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the config

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{BreakerConfig, GuardConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate one breaker's tunables.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_breaker(config, &config.name, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a full configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_breaker(&config.defaults, "defaults", &mut errors);

    let mut seen = HashSet::new();
    for (i, breaker) in config.breakers.iter().enumerate() {
        let prefix = format!("breakers[{}]", i);
        check_breaker(breaker, &prefix, &mut errors);
        if !seen.insert(breaker.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", prefix),
                format!("duplicate breaker name '{}'", breaker.name),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_breaker(config: &BreakerConfig, prefix: &str, errors: &mut Vec<ValidationError>) {
    if config.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{}.name", prefix),
            "must not be empty",
        ));
    }
    if config.failure_threshold == 0 {
        errors.push(ValidationError::new(
            format!("{}.failure_threshold", prefix),
            "must be greater than 0",
        ));
    }
    if config.success_threshold == 0 {
        errors.push(ValidationError::new(
            format!("{}.success_threshold", prefix),
            "must be greater than 0",
        ));
    }
    if config.timeout_ms == 0 {
        errors.push(ValidationError::new(
            format!("{}.timeout_ms", prefix),
            "must be greater than 0",
        ));
    }
}
