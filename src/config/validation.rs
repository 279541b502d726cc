//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, limits > 0, parseable bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the configuration for semantic problems, reporting every
/// violation found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }
    if config.serve.root.is_empty() {
        errors.push(ValidationError {
            field: "serve.root",
            message: "must not be empty".to_string(),
        });
    }
    if config.serve.redirect_url.is_empty() {
        errors.push(ValidationError {
            field: "serve.redirect_url",
            message: "must not be empty".to_string(),
        });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_secs",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.rate_limit.download_limit == 0 {
        errors.push(ValidationError {
            field: "rate_limit.download_limit",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.rate_limit.raw_limit == 0 {
        errors.push(ValidationError {
            field: "rate_limit.raw_limit",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.rate_limit.throttle_bytes_per_sec == 0 {
        errors.push(ValidationError {
            field: "rate_limit.throttle_bytes_per_sec",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
