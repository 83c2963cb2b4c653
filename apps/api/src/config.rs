use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_GEMINI_URL;
use crate::resilience::BreakerConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// `None` means any origin is allowed.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub breaker: BreakerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = BreakerConfig::default();
        let breaker = BreakerConfig {
            timeout: Duration::from_millis(parse_or(
                &lookup,
                "BREAKER_TIMEOUT_MS",
                defaults.timeout.as_millis() as u64,
            )?),
            error_threshold_percentage: parse_or(
                &lookup,
                "BREAKER_ERROR_THRESHOLD_PERCENTAGE",
                defaults.error_threshold_percentage,
            )?,
            reset_timeout: Duration::from_millis(parse_or(
                &lookup,
                "BREAKER_RESET_TIMEOUT_MS",
                defaults.reset_timeout.as_millis() as u64,
            )?),
            rolling_window_size: parse_or(
                &lookup,
                "BREAKER_ROLLING_WINDOW_SIZE",
                defaults.rolling_window_size,
            )?,
            minimum_samples: parse_or(&lookup, "BREAKER_MINIMUM_SAMPLES", defaults.minimum_samples)?,
        };
        breaker.validate().context("Invalid circuit breaker configuration")?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        });

        Ok(Config {
            gemini_api_key: lookup("GEMINI_API_KEY")
                .filter(|k| !k.is_empty())
                .context("Required environment variable 'GEMINI_API_KEY' is not set")?,
            gemini_api_url: lookup("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cors_allowed_origins,
            breaker,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.gemini_api_url, DEFAULT_GEMINI_URL);
        assert_eq!(config.rust_log, "info");
        assert!(config.cors_allowed_origins.is_none());
        assert_eq!(config.breaker.timeout, Duration::from_millis(500_000));
        assert_eq!(config.breaker.error_threshold_percentage, 50);
        assert_eq!(config.breaker.reset_timeout, Duration::from_millis(30_000));
    }

    #[test]
    fn test_missing_api_key() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(config_from(&[("GEMINI_API_KEY", "")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "k"),
            ("PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("BREAKER_TIMEOUT_MS", "2000"),
            ("BREAKER_ROLLING_WINDOW_SIZE", "20"),
            ("BREAKER_MINIMUM_SAMPLES", "5"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_allowed_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(config.breaker.timeout, Duration::from_secs(2));
        assert_eq!(config.breaker.rolling_window_size, 20);
        assert_eq!(config.breaker.minimum_samples, 5);
    }

    #[test]
    fn test_bad_numbers_rejected() {
        let err = config_from(&[("GEMINI_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = config_from(&[
            ("GEMINI_API_KEY", "k"),
            ("BREAKER_ERROR_THRESHOLD_PERCENTAGE", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("breaker"));
    }
}
