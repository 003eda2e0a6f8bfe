use crate::{Config, WeatherRecord, error::FetchError, provider::weatherapi::WeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Source of current conditions for a city name.
///
/// Implementations hold no shared mutable state; concurrent calls are
/// independent of each other.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the latest observation for `city_name`.
    ///
    /// Blank input fails with [`FetchError::InvalidInput`] before any I/O.
    async fn fetch(&self, city_name: &str) -> Result<WeatherRecord, FetchError>;
}

/// Construct the WeatherAPI.com client from config.
///
/// `env_api_key` (normally `WEATHERAPI_KEY`) takes precedence over the file.
pub fn client_from_config(
    config: &Config,
    env_api_key: Option<String>,
) -> anyhow::Result<WeatherClient> {
    let api_key = config.effective_api_key(env_api_key).ok_or_else(|| {
        anyhow::anyhow!(
            "No WeatherAPI key configured.\n\
                 Hint: run `cityweather configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let client = match &config.endpoint {
        Some(endpoint) => WeatherClient::with_endpoint(api_key, endpoint.as_str()),
        None => WeatherClient::new(api_key),
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn client_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = client_from_config(&cfg, None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI key configured"));
        assert!(msg.contains("Hint: run `cityweather configure`"));
    }

    #[test]
    fn client_from_config_uses_env_key_without_file_key() {
        let cfg = Config::default();
        assert!(client_from_config(&cfg, Some("ENV_KEY".into())).is_ok());
    }

    #[test]
    fn client_from_config_honours_endpoint_override() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            endpoint: Some("http://localhost:8080/v1/current.json".into()),
            ..Config::default()
        };

        let client = client_from_config(&cfg, None).expect("key is configured");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/current.json");
    }

    #[test]
    fn client_from_config_defaults_to_weatherapi() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        let client = client_from_config(&cfg, None).expect("key is configured");
        assert_eq!(client.endpoint(), weatherapi::CURRENT_ENDPOINT);
    }
}
