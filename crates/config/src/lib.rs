//! Runtime configuration for the hybrid search service.
//!
//! Loads from, in increasing priority: `config/default.*`,
//! `config/{environment}.*`, then `ASSISTSUPPORT__`-prefixed
//! environment variables. See [`settings::load_settings`].

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, AuthConfig, RateLimitConfig, RuntimeEnvironment, SearchConfig, ServerConfig,
    Settings, StoreConfig, DEFAULT_API_KEY, DEFAULT_API_PORT, DEFAULT_RATE_LIMIT_STORAGE_URI,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
