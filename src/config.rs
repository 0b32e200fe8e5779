// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_CREDENTIALS_PATH: &str = ".storefront/credentials.json";

/// Renew the access token this long before it expires.
pub const DEFAULT_REFRESH_LEAD_SECS: i64 = 60;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the storefront REST backend
    pub api_base_url: String,
    /// File holding the persisted credential
    pub credentials_path: PathBuf,
    /// Lead time before access token expiry at which renewal fires
    pub refresh_lead_secs: i64,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// Upper bound on a single token refresh call
    pub refresh_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing and local development.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            refresh_lead_secs: DEFAULT_REFRESH_LEAD_SECS,
            http_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured. Every variable is
    /// optional; unparseable numbers are rejected rather than defaulted.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("STOREFRONT_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            credentials_path: env::var("STOREFRONT_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            refresh_lead_secs: parse_var("STOREFRONT_REFRESH_LEAD_SECS")?
                .unwrap_or(defaults.refresh_lead_secs),
            http_timeout: parse_var("STOREFRONT_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            refresh_timeout: parse_var("STOREFRONT_REFRESH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_timeout),
        })
    }

    /// Configuration pointing at a specific backend, other fields defaulted.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("STOREFRONT_API_URL", "http://shop.test:9000/");
        env::set_var("STOREFRONT_REFRESH_LEAD_SECS", "30");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "http://shop.test:9000");
        assert_eq!(config.refresh_lead_secs, 30);
        assert_eq!(config.refresh_timeout, Duration::from_secs(10));

        env::set_var("STOREFRONT_REFRESH_LEAD_SECS", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("STOREFRONT_REFRESH_LEAD_SECS", _))
        ));

        env::remove_var("STOREFRONT_API_URL");
        env::remove_var("STOREFRONT_REFRESH_LEAD_SECS");
    }

    #[test]
    fn test_with_base_url_keeps_defaults() {
        let config = Config::with_base_url("http://127.0.0.1:1");
        assert_eq!(config.api_base_url, "http://127.0.0.1:1");
        assert_eq!(config.refresh_lead_secs, DEFAULT_REFRESH_LEAD_SECS);
    }
}
