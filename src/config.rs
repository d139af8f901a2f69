//! Process configuration, read once from the environment

use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub gemini_api_key: String,
    /// Keep-alive listener port
    pub port: u16,
    pub generation_timeout: Duration,
    /// Skip catalogue discovery and use this model
    pub pinned_model: Option<String>,
    /// Alternate Gemini endpoint (gateway or local test server)
    pub gemini_base_url: Option<String>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name: "PORT",
                    value,
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match var("GENERATION_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        name: "GENERATION_TIMEOUT_SECS",
                        value,
                        reason: "must be positive".to_string(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "GENERATION_TIMEOUT_SECS",
                        value,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        Ok(Self {
            telegram_token: required("TELEGRAM_TOKEN")?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            port,
            generation_timeout: Duration::from_secs(timeout_secs),
            pinned_model: var("GEMINI_MODEL"),
            gemini_base_url: var("GEMINI_API_BASE"),
        })
    }
}

// Credentials stay out of logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .field("port", &self.port)
            .field("generation_timeout", &self.generation_timeout)
            .field("pinned_model", &self.pinned_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .finish()
    }
}
