use crate::error::{PriceFetchError, Result};
use crate::models::{FetchMode, ProxyConfig, TargetSite, DEFAULT_BASE_URL};
use crate::services::DelayRange;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Residential proxy and its rotation endpoint
    pub proxy: ProxyConfig,
    /// Target site configuration
    pub target: TargetConfig,
    /// Batch pacing
    pub batch: BatchConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Storefront root (default: https://www.ozon.ru)
    pub base_url: String,
    /// Page or API fetching (default: page)
    pub mode: FetchMode,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Random pause between identifiers (default: 4-8s)
    pub delay: DelayRange,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let proxy_url = require_env("PROXY_URL")?;
        let rotation_url = require_env("PROXY_ROTATION_URL")?;

        let mode = FetchMode::from_str(&get_env_or("FETCH_MODE", "page")).ok_or_else(|| {
            PriceFetchError::InvalidConfig("FETCH_MODE must be 'page' or 'api'".into())
        })?;

        let delay_min: f64 = get_env_or("DELAY_MIN_SECS", "4").parse().map_err(|_| {
            PriceFetchError::InvalidConfig("DELAY_MIN_SECS must be a number".into())
        })?;
        let delay_max: f64 = get_env_or("DELAY_MAX_SECS", "8").parse().map_err(|_| {
            PriceFetchError::InvalidConfig("DELAY_MAX_SECS must be a number".into())
        })?;

        let format = get_env_or("LOG_FORMAT", "pretty").to_lowercase();
        if !matches!(format.as_str(), "pretty" | "json") {
            return Err(PriceFetchError::InvalidConfig(
                "LOG_FORMAT must be 'pretty' or 'json'".into(),
            ));
        }

        Ok(Config {
            proxy: ProxyConfig::from_url(&proxy_url, &rotation_url)?,
            target: TargetConfig {
                base_url: get_env_or("TARGET_BASE_URL", DEFAULT_BASE_URL),
                mode,
            },
            batch: BatchConfig {
                delay: DelayRange::from_secs_f64(delay_min, delay_max)?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format,
            },
        })
    }

    /// Target site addresses for the configured base URL
    pub fn target_site(&self) -> TargetSite {
        TargetSite::new(self.target.base_url.as_str())
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required, non-empty environment variable
fn require_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PriceFetchError::MissingEnvVar(key.to_string())),
    }
}
