//! Configuration validation rules.
//!
//! - The shell must be non-empty
//! - The fetch timeout must be positive
//! - Pins must name valid packages and be 64 hex characters

use crate::bean::is_valid_name;
use crate::config::schema::EspressoConfig;
use crate::error::{EspressoError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &EspressoConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.shell.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-shell",
            "'shell' must not be empty".to_string(),
        ));
    }

    if config.fetch_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "'fetch_timeout_secs' must be greater than zero".to_string(),
        ));
    }

    if config.source.as_deref().is_some_and(|s| s.trim().is_empty()) {
        errors.push(ValidationError::new(
            "empty-source",
            "'source' must not be empty".to_string(),
        ));
    }

    let mut pinned: Vec<_> = config.pins.iter().collect();
    pinned.sort();
    for (name, digest) in pinned {
        if !is_valid_name(name) {
            errors.push(ValidationError::new(
                "invalid-pin-name",
                format!("Pin for '{}' does not name a valid package", name),
            ));
        }
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            errors.push(ValidationError::new(
                "invalid-pin-digest",
                format!("Pin for '{}' must be a 64-character sha256 hex digest", name),
            ));
        }
    }

    errors
}

/// Validate and return the first error as a `ConfigValidationError`.
pub fn validate(config: &EspressoConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(EspressoError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
