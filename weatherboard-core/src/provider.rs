use crate::{Config, FetchError, WeatherReport, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Source of weather reports for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions and the multi-day forecast for `city`.
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_from_key(config.resolve_api_key(), config)
}

/// Construct the provider from an already resolved key.
pub fn provider_from_key(
    api_key: Option<String>,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No WeatherAPI.com key configured.\n\
             Hint: export {}=<key> or run `weatherboard configure`.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(Box::new(WeatherApiProvider::new(api_key, config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_works_with_file_key() {
        let cfg = Config { api_key: Some("KEY".to_string()), ..Config::default() };
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_key_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_key(cfg.resolve_api_key_with(|_| None), &cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI.com key configured"));
        assert!(msg.contains("Hint: export WEATHERAPI_KEY=<key>"));
        assert!(msg.contains("weatherboard configure"));
    }

    #[test]
    fn provider_from_key_uses_env_key_over_empty_file() {
        let cfg = Config::default();
        let key = cfg.resolve_api_key_with(|_| Some("ENV_KEY".to_string()));
        assert!(provider_from_key(key, &cfg).is_ok());
    }
}
