//! Configuration validation for DateChat services.
//!
//! Checks that required values are present and within valid ranges before
//! the service starts.

use thiserror::Error;

use crate::config::{Config, LlmConfig, ObservabilityConfig, ServerConfig, SessionConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.validate() {
            errors.push(e);
        }
        if let Err(e) = self.session.validate() {
            errors.push(e);
        }
        if let Err(e) = self.llm.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load (with env overrides) and validate configuration.
    pub fn load_and_validate() -> crate::error::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "server.port".into(),
            });
        }
        if self.body_limit_bytes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "server.body_limit_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.cookie_name.is_empty() {
            return Err(ValidationError::MissingField {
                field: "session.cookie_name".into(),
            });
        }
        // RFC 6265 token characters only
        let token_safe = self
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c));
        if !token_safe {
            return Err(ValidationError::InvalidValue {
                field: "session.cookie_name".into(),
                reason: format!("'{}' is not a valid cookie name", self.cookie_name),
            });
        }

        for (value, field) in [
            (self.cookie_max_age_secs, "session.cookie_max_age_secs"),
            (self.ttl_secs, "session.ttl_secs"),
            (self.purge_interval_secs, "session.purge_interval_secs"),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "must be greater than 0".into(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> ValidationResult<()> {
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(ValidationError::InvalidValue {
                field: "llm.base_url".into(),
                reason: e.to_string(),
            });
        }

        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "llm.model".into(),
            });
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidValue {
                field: "llm.temperature".into(),
                reason: "must be between 0.0 and 2.0".into(),
            });
        }

        if matches!(self.max_tokens, Some(n) if n <= 0) {
            return Err(ValidationError::InvalidValue {
                field: "llm.max_tokens".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "llm.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}
