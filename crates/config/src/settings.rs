//! Runtime configuration: environment, server, auth, rate limiting,
//! search tuning, and store connection settings, loaded and validated
//! the way `voice_agent_config::settings::load_settings` does —
//! `config::Config::builder()` layering a base file, an
//! environment-specific file, then `ASSISTSUPPORT_`-prefixed env vars,
//! followed by an explicit `validate()` pass.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::fusion;
use crate::ConfigError;

/// Matches `runtime_config.py::load_runtime_config`'s allowed values
/// (development/production/test), renamed `test` -> `staging` would
/// not be faithful, so the variant is spelled the way the original
/// spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuntimeEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                field: "environment".into(),
                message: format!("unknown environment `{other}`"),
            }),
        }
    }
}

pub const DEFAULT_API_KEY: &str = "dev-key-change-in-production";
pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_RATE_LIMIT_STORAGE_URI: &str = "memory://";

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_rate_limit_uri() -> String {
    DEFAULT_RATE_LIMIT_STORAGE_URI.to_string()
}

fn default_true() -> bool {
    true
}

/// Bearer-token auth, enforced only in production (spec §7 /
/// `require_api_key` in the Python original only checks in prod).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
        }
    }
}

/// Per-caller request rate limiting (spec §5 / Python's "100 per
/// minute" flask-limiter rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_rate_limit_uri")]
    pub storage_uri: String,
}

fn default_requests_per_minute() -> u32 {
    100
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: default_requests_per_minute(),
            storage_uri: default_rate_limit_uri(),
        }
    }
}

/// HTTP server bind settings and CORS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Tuning knobs the operator may legitimately want to change per
/// deployment, distinct from the fixed algorithm constants in
/// `crate::constants`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub vector_search_enabled: bool,
    #[serde(default = "default_true")]
    pub reranking_enabled: bool,
    #[serde(default = "default_ef_search")]
    pub ef_search: u32,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

fn default_ef_search() -> u32 {
    100
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            vector_search_enabled: true,
            reranking_enabled: true,
            ef_search: default_ef_search(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

/// Postgres+pgvector connection settings (spec §6.2's storage engine
/// is out of scope for the retrieval core's decisions, but the
/// service still needs to know how to connect to it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_user")]
    pub db_user: String,
    #[serde(default)]
    pub db_password: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_user() -> String {
    "assistsupport".to_string()
}
fn default_db_name() -> String {
    "assistsupport".to_string()
}
fn default_pool_size() -> u32 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_user: default_db_user(),
            db_password: String::new(),
            db_name: default_db_name(),
            pool_size: default_pool_size(),
        }
    }
}

/// Top-level settings object, the single value every other crate reads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Settings {
    /// Mirrors `validate_runtime_config`: environment-independent range
    /// checks plus production-only fail-closed guards against
    /// shipping dev defaults.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::InvalidValue {
                field: "server.port".into(),
                message: "must be in 1..=65535".into(),
            });
        }
        if self.store.db_port == 0 {
            errors.push(ConfigError::InvalidValue {
                field: "store.db_port".into(),
                message: "must be in 1..=65535".into(),
            });
        }

        let (bw, vw) = fusion::ADAPTIVE_WEIGHTS_UNKNOWN;
        if !(0.0..=1.0).contains(&bw) || !(0.0..=1.0).contains(&vw) {
            errors.push(ConfigError::InvalidValue {
                field: "fusion.adaptive_weights_unknown".into(),
                message: "weights must be in [0, 1]".into(),
            });
        }

        if self.environment.is_production() {
            if self.server.auth.api_key == DEFAULT_API_KEY {
                errors.push(ConfigError::InvalidValue {
                    field: "server.auth.api_key".into(),
                    message: "default API key must not be used in production".into(),
                });
            }
            if self.server.rate_limit.storage_uri == DEFAULT_RATE_LIMIT_STORAGE_URI {
                errors.push(ConfigError::InvalidValue {
                    field: "server.rate_limit.storage_uri".into(),
                    message: "memory:// rate-limit backend must not be used in production".into(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads layered config: `config/default.{yaml,toml}`, then
/// `config/{environment}.{yaml,toml}`, then `ASSISTSUPPORT__`-prefixed
/// environment variables (double underscore as nested-field
/// separator), then validates.
pub fn load_settings(environment: RuntimeEnvironment) -> Result<Settings, ConfigError> {
    let env_name = match environment {
        RuntimeEnvironment::Development => "development",
        RuntimeEnvironment::Test => "test",
        RuntimeEnvironment::Production => "production",
    };

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(
            Environment::with_prefix("ASSISTSUPPORT")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build().map_err(ConfigError::from)?;
    let settings: Settings = config.try_deserialize().map_err(ConfigError::from)?;

    settings
        .validate()
        .map_err(|errors| ConfigError::InvalidValue {
            field: "settings".into(),
            message: errors
                .into_iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid_in_development() {
        let settings = Settings::default();
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert_eq!(settings.server.port, DEFAULT_API_PORT);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn production_rejects_default_api_key_and_memory_rate_limit() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        let errors = settings.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidValue { field, .. } if field == "server.auth.api_key")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidValue { field, .. } if field == "server.rate_limit.storage_uri")));
    }

    #[test]
    fn production_accepts_overridden_secrets() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.server.auth.api_key = "a-real-secret".into();
        settings.server.rate_limit.storage_uri = "redis://localhost:6379".into();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn environment_parses_known_values_only() {
        use std::str::FromStr;
        assert_eq!(RuntimeEnvironment::from_str("production").unwrap(), RuntimeEnvironment::Production);
        assert!(RuntimeEnvironment::from_str("bogus").is_err());
    }
}
