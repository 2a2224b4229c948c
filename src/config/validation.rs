//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, gas limit > 0)
//! - Check the endpoint parses as a URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Address and key formats are checked where they are used, so their
//!   failures carry the binding and key error kinds

use std::fmt;

use crate::config::schema::InteractConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a loaded configuration.
pub fn validate_config(config: &InteractConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = config.network.endpoint.trim();
    if endpoint.is_empty() {
        errors.push(ValidationError::new("network.endpoint", "must not be empty"));
    } else if let Err(e) = endpoint.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "network.endpoint",
            format!("invalid URL: {}", e),
        ));
    }

    if config.network.chain_id == 0 {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be non-zero"));
    }

    if config.contract.address.trim().is_empty() {
        errors.push(ValidationError::new("contract.address", "must not be empty"));
    }

    let tx = &config.transaction;
    if tx.gas_limit == 0 {
        errors.push(ValidationError::new("transaction.gas_limit", "must be non-zero"));
    }
    if tx.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transaction.confirmation_timeout_secs",
            "must be non-zero",
        ));
    }
    if tx.poll_interval_ms == 0 {
        errors.push(ValidationError::new("transaction.poll_interval_ms", "must be non-zero"));
    }
    if tx.required_confirmations == 0 {
        errors.push(ValidationError::new(
            "transaction.required_confirmations",
            "must be at least 1",
        ));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
