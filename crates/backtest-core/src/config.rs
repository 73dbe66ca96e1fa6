//! Configuration management for the backtester.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

const DEFAULT_FINMIND_URL: &str = "https://api.finmindtrade.com/api/v4/data";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub finmind: FinMindConfig,
}

/// FinMind data-provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FinMindConfig {
    pub api_url: String,
    /// Optional API token; anonymous requests are rate-limited harder.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("FINMIND_API_URL").unwrap_or_else(|_| DEFAULT_FINMIND_URL.to_string());
        if api_url.is_empty() {
            return Err(Error::Config {
                message: "FINMIND_API_URL must not be empty".to_string(),
            });
        }

        Ok(Self {
            finmind: FinMindConfig {
                api_url,
                token: env::var("FINMIND_TOKEN").ok().filter(|t| !t.is_empty()),
            },
        })
    }
}

impl Default for FinMindConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_FINMIND_URL.to_string(),
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_finmind_config() {
        let config = FinMindConfig::default();
        assert_eq!(config.api_url, DEFAULT_FINMIND_URL);
        assert!(config.token.is_none());
    }
}
