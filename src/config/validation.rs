//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs parse
//! - Validate value ranges (timeouts > 0, delay ranges ordered)
//! - Check the schedule time is a real wall-clock time
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use chrono::NaiveTime;

use crate::config::schema::{AppConfig, DelayRange};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let urls = [
        ("site.base_url", &config.site.base_url),
        ("site.api_url", &config.site.api_url),
        ("site.gql_url", &config.site.gql_url),
        ("site.callback_url", &config.site.callback_url),
        ("sign_in.uri", &config.sign_in.uri),
    ];
    for (field, value) in urls {
        if let Err(e) = url::Url::parse(value) {
            errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
        }
    }

    if config.sign_in.domain.trim().is_empty() {
        errors.push(ValidationError::new("sign_in.domain", "must not be empty"));
    }
    if config.sign_in.chain_id == 0 {
        errors.push(ValidationError::new("sign_in.chain_id", "must be non-zero"));
    }

    if config.browser.navigation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "browser.navigation_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.browser.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "browser.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    check_range(&mut errors, "delays.between_wallets", config.delays.between_wallets);
    check_range(&mut errors, "delays.between_actions", config.delays.between_actions);
    check_range(&mut errors, "delays.after_login", config.delays.after_login);

    if NaiveTime::parse_from_str(&config.schedule.daily_at, "%H:%M").is_err() {
        errors.push(ValidationError::new(
            "schedule.daily_at",
            format!("'{}' is not a HH:MM time", config.schedule.daily_at),
        ));
    }
    if !(-12..=14).contains(&config.schedule.utc_offset_hours) {
        errors.push(ValidationError::new(
            "schedule.utc_offset_hours",
            "must be between -12 and 14",
        ));
    }

    if config.wallets.file.trim().is_empty() && config.wallets.env_var.trim().is_empty() {
        errors.push(ValidationError::new(
            "wallets",
            "either a key file or an environment variable is required",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_range(errors: &mut Vec<ValidationError>, field: &str, range: DelayRange) {
    if range.min_ms > range.max_ms {
        errors.push(ValidationError::new(
            field,
            format!("min_ms {} exceeds max_ms {}", range.min_ms, range.max_ms),
        ));
    }
}
