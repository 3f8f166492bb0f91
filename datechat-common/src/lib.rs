//! DateChat Common - Shared types, utilities, and configuration for the DateChat services.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Config loading errors
//! - Logging setup
//! - Small string utilities (masking, log sanitizing)

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    Config, LlmConfig, NetworkConfig, ObservabilityConfig, ServerConfig, SessionConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};
