//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses (listener socket address, upstream authority)
//! - Validate value ranges (timeouts > 0, bucket capacity >= 1)
//! - Validate inspected method names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WafConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use axum::http::Method;
use thiserror::Error;

use crate::config::schema::WafConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &WafConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match config.upstream.address.parse::<Authority>() {
        Ok(authority) if authority.port_u16().is_some() => {}
        Ok(_) => errors.push(ValidationError::new(
            "upstream.address",
            format!("'{}' is missing a port", config.upstream.address),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.address",
            format!("'{}' is not a host:port authority: {}", config.upstream.address, e),
        )),
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be greater than 0"));
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.request_timeout_secs", "must be greater than 0"));
    }

    let capacity = config.rate_limit.capacity;
    if !capacity.is_finite() || capacity < 1.0 {
        errors.push(ValidationError::new("rate_limit.capacity", "must be a finite number >= 1"));
    }
    let refill = config.rate_limit.refill_per_second;
    if !refill.is_finite() || refill <= 0.0 {
        errors.push(ValidationError::new("rate_limit.refill_per_second", "must be a finite number > 0"));
    }

    for name in &config.inspection.body_methods {
        if Method::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "inspection.body_methods",
                format!("'{}' is not a valid HTTP method", name),
            ));
        }
    }
    if config.inspection.max_body_size == Some(0) {
        errors.push(ValidationError::new("inspection.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
