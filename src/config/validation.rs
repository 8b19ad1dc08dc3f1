//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Header names must be valid HTTP header names
//! - Validate value ranges (timeouts > 0, ports numeric)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::BridgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
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

/// Parse a configured header name.
pub fn parse_header_name(field: &'static str, name: &str) -> Result<HeaderName, ValidationError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ValidationError::new(field, format!("invalid header name {name:?}")))
}

/// Check every semantic rule and collect the violations.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let headers = [
        ("headers.ticket", &config.headers.ticket),
        ("headers.trace", &config.headers.trace),
        ("headers.flush_count", &config.headers.flush_count),
        ("headers.user_ip", &config.headers.user_ip),
        ("headers.remote_addr", &config.headers.remote_addr),
    ];
    for (field, name) in headers {
        if let Err(e) = parse_header_name(field, name) {
            errors.push(e);
        }
    }

    if config.api.default_port.parse::<u16>().is_err() {
        errors.push(ValidationError::new(
            "api.default_port",
            format!("not a port number: {:?}", config.api.default_port),
        ));
    }
    if config.api.default_host.is_empty() {
        errors.push(ValidationError::new("api.default_host", "must not be empty"));
    }
    if !config.api.path.starts_with('/') {
        errors.push(ValidationError::new("api.path", "must start with '/'"));
    }
    if config.api.default_timeout_ms == 0 {
        errors.push(ValidationError::new("api.default_timeout_ms", "must be greater than 0"));
    }
    if config.api.dial_timeout_ms == 0 {
        errors.push(ValidationError::new("api.dial_timeout_ms", "must be greater than 0"));
    }
    if config.api.max_concurrent_calls == 0 {
        errors.push(ValidationError::new("api.max_concurrent_calls", "must be greater than 0"));
    }

    if config.logs.flush_service.is_empty() || config.logs.flush_method.is_empty() {
        errors.push(ValidationError::new("logs", "flush service and method are required"));
    }
    if config.logs.flush_timeout_ms == 0 {
        errors.push(ValidationError::new("logs.flush_timeout_ms", "must be greater than 0"));
    }
    if config.logs.max_message_bytes == 0 {
        errors.push(ValidationError::new("logs.max_message_bytes", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
