//! Configuration management for DateChat services.
//!
//! All services share one configuration file at `~/.datechat/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (DATECHAT_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `DATECHAT_PORT` → server.port
//! - `DATECHAT_BIND_ADDRESS` → network.bind
//! - `DATECHAT_LOG_LEVEL` → observability.log_level
//! - `DATECHAT_LLM_BASE_URL` → llm.base_url
//! - `DATECHAT_LLM_MODEL` → llm.model

use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".datechat"),
        |dirs| dirs.home_dir().join(".datechat"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network / Server
// ============================================================================

/// Global network configuration.
///
/// Default bind address is `127.0.0.1` (local only). Set to `0.0.0.0` to
/// allow remote access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Session cookie and store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// `Max-Age` of the session cookie.
    #[serde(default = "default_one_day")]
    pub cookie_max_age_secs: u64,

    /// Idle time after which the in-memory store drops a session.
    #[serde(default = "default_one_day")]
    pub ttl_secs: u64,

    /// How often the purge task runs.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_max_age_secs: default_one_day(),
            ttl_secs: default_one_day(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

// ============================================================================
// LLM
// ============================================================================

/// Chat-completion endpoint settings.
///
/// The API key itself is never configured here: each user brings their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default)]
    pub max_tokens: Option<i64>,

    /// Timeout for one completion request.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

// ============================================================================
// Observability
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to set to `warn`.
    ///
    /// Built-in noisy modules (hyper, reqwest, h2, rustls, ...) are always
    /// filtered; this list adds custom ones.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("DATECHAT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            } else {
                tracing::warn!(value = %port, "Ignoring unparsable DATECHAT_PORT");
            }
        }

        if let Ok(bind) = std::env::var("DATECHAT_BIND_ADDRESS") {
            self.network.bind = bind;
        }

        if let Ok(level) = std::env::var("DATECHAT_LOG_LEVEL") {
            self.observability.log_level = level;
        }

        if let Ok(url) = std::env::var("DATECHAT_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("DATECHAT_LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Socket address string the web service listens on.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.network.bind, self.server.port)
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    4480
}
fn default_body_limit() -> usize {
    64 * 1024
}
fn default_cookie_name() -> String {
    "SESSION".into()
}
fn default_one_day() -> u64 {
    86_400
}
fn default_purge_interval() -> u64 {
    300
}
fn default_llm_base_url() -> String {
    "https://api.openai.com".into()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.8
}
fn default_llm_timeout() -> u64 {
    120
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
