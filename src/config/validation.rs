//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, redirect bound)
//! - Check that the request timeout fits under the engine ceiling
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::ClientConfig;

/// Upper bound accepted for `transport.max_redirects`.
pub const MAX_REDIRECT_LIMIT: u32 = 50;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("transport.max_redirects {0} exceeds the limit of {limit}", limit = MAX_REDIRECT_LIMIT)]
    TooManyRedirects(u32),

    #[error("request.timeout_ms {timeout_ms} exceeds transport.timeout_ceiling_secs {ceiling_secs}")]
    TimeoutAboveCeiling { timeout_ms: u64, ceiling_secs: u64 },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let transport = &config.transport;
    let request = &config.request;

    if transport.timeout_ceiling_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "transport.timeout_ceiling_secs",
        });
    }
    if transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "transport.connect_timeout_secs",
        });
    }
    if transport.auto_redirect && transport.max_redirects > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::TooManyRedirects(transport.max_redirects));
    }

    if request.timeout_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "request.timeout_ms",
        });
    } else if transport.timeout_ceiling_secs > 0
        && request.timeout_ms > transport.timeout_ceiling_secs.saturating_mul(1000)
    {
        errors.push(ValidationError::TimeoutAboveCeiling {
            timeout_ms: request.timeout_ms,
            ceiling_secs: transport.timeout_ceiling_secs,
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
