//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::errors::{Result, ServiceError};

/// Base name of the optional configuration file (`.toml`, `.json`, `.yaml`)
pub const CONFIG_FILE: &str = "simplify-translator";

/// Prefix of environment overrides, e.g. `APP__OPENAI__API_KEY`
pub const ENV_PREFIX: &str = "APP";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub translate: EndpointConfig,
    pub readability: EndpointConfig,
    pub bleu: EndpointConfig,
    pub rate_limit: RateLimitConfig,
    pub timeout_ms: u64,
    /// Directory receiving exported documents; system temp dir when unset
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub endpoint: String,
}

/// A JSON-over-HTTP collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per period and burst size
    pub capacity: u32,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            period_secs: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            openai: OpenAiConfig {
                api_key: String::new(),
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            },
            translate: EndpointConfig {
                endpoint: "http://127.0.0.1:9001/translate".to_string(),
                api_key: None,
            },
            readability: EndpointConfig {
                endpoint: "http://127.0.0.1:9002/readability".to_string(),
                api_key: None,
            },
            bleu: EndpointConfig {
                endpoint: "http://127.0.0.1:9003/bleu".to_string(),
                api_key: None,
            },
            rate_limit: RateLimitConfig::default(),
            timeout_ms: 30000,
            export_dir: None,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the optional config file, then `APP__*` environment variables
    pub fn load() -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        info!(
            "Loaded configuration (server {}:{}, rate limit {}/{}s)",
            config.server.host,
            config.server.port,
            config.rate_limit.capacity,
            config.rate_limit.period_secs
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.openai.api_key.is_empty() {
            warn!("OpenAI API key is not configured; translate requests will fail");
        }

        let endpoints = [
            ("openai.endpoint", &self.openai.endpoint),
            ("translate.endpoint", &self.translate.endpoint),
            ("readability.endpoint", &self.readability.endpoint),
            ("bleu.endpoint", &self.bleu.endpoint),
        ];
        for (name, endpoint) in endpoints {
            if endpoint.is_empty() {
                return Err(ServiceError::ConfigError {
                    message: format!("{} is required", name),
                });
            }
        }

        if self.rate_limit.capacity == 0 {
            return Err(ServiceError::ConfigError {
                message: "rate_limit.capacity must be greater than 0".to_string(),
            });
        }

        if self.rate_limit.period_secs == 0 {
            return Err(ServiceError::ConfigError {
                message: "rate_limit.period_secs must be greater than 0".to_string(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(ServiceError::ConfigError {
                message: "timeout_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Directory exported documents are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
