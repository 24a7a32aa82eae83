//! Service configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_SUPPORT_REPLY_DELAY_MS: u64 = 1500;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "E_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub support_reply_delay: Duration,
    pub responsible_ai_data_path: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `PORT`: default 3000
    /// - `SUPPORT_REPLY_DELAY_MS`: simulated support "thinking" time, default 1500
    /// - `RESPONSIBLE_AI_DATA_PATH`: replaces the embedded policy fixture
    /// - `LOG_LEVEL`: default `info` (`RUST_LOG` still wins when set)
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let delay_ms = env_parse("SUPPORT_REPLY_DELAY_MS", DEFAULT_SUPPORT_REPLY_DELAY_MS)?;
        let responsible_ai_data_path = std::env::var("RESPONSIBLE_AI_DATA_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            bind_addr,
            port,
            support_reply_delay: Duration::from_millis(delay_ms),
            responsible_ai_data_path,
            log_level,
        })
    }

    /// Socket address string for the listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            support_reply_delay: Duration::from_millis(DEFAULT_SUPPORT_REPLY_DELAY_MS),
            responsible_ai_data_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Parse an env var, falling back to `default` only when it is unset.
fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
