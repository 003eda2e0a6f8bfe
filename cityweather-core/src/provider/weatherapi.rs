use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::Error as _;
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::{error::FetchError, model::WeatherRecord};

use super::WeatherProvider;

pub const CURRENT_ENDPOINT: &str = "https://api.weatherapi.com/v1/current.json";

/// Client for the WeatherAPI.com `current.json` endpoint.
///
/// One GET per call, no retries, transport default timeouts.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, CURRENT_ENDPOINT)
    }

    /// Point the client at a different `current.json` URL (mirrors, test servers).
    pub fn with_endpoint(api_key: String, endpoint: impl Into<String>) -> Self {
        Self { api_key, endpoint: endpoint.into(), http: Client::new() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, city: &str) -> String {
        format!(
            "{}?key={}&q={}",
            self.endpoint,
            urlencoding::encode(&self.api_key),
            encode_city(city),
        )
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        debug!(city, endpoint = %self.endpoint, "Requesting current weather");

        let res = self.http.get(self.request_url(city)).send().await.inspect_err(|e| {
            warn!(city, error = %e, "WeatherAPI request failed");
        })?;

        let status = res.status();
        let body = res.bytes().await?;
        debug!(city, %status, bytes = body.len(), "WeatherAPI response received");

        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_slice::<WaErrorEnvelope>(&body) {
                return Err(FetchError::Provider {
                    status: status.as_u16(),
                    message: envelope.error.message,
                });
            }
        }

        decode_current(&body).inspect_err(|e| {
            warn!(
                city,
                error = %e,
                body = %truncate_body(&String::from_utf8_lossy(&body)),
                "Failed to decode WeatherAPI response"
            );
        })
    }
}

/// Percent-encodes a city name for the `q` query parameter.
///
/// Encoding a UTF-8 string cannot fail, so the raw name is never sent as-is.
fn encode_city(city: &str) -> Cow<'_, str> {
    urlencoding::encode(city)
}

/// Decode a `current.json` body into a record. Every field is required.
pub fn decode_current(body: &[u8]) -> Result<WeatherRecord, FetchError> {
    let parsed: WaResponse = serde_json::from_slice(body)?;

    if parsed.location.name.trim().is_empty() {
        return Err(FetchError::Decode(serde_json::Error::custom(
            "location.name is empty",
        )));
    }

    Ok(WeatherRecord::new(
        parsed.location.name,
        parsed.current.temp_c,
        parsed.current.temp_f,
        parsed.current.condition.text,
        parsed.current.condition.code,
    ))
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    error: WaErrorBody,
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch(&self, city_name: &str) -> Result<WeatherRecord, FetchError> {
        let city = city_name.trim();
        if city.is_empty() {
            return Err(FetchError::InvalidInput);
        }

        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> Cow<'_, str> {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &body[..idx])),
        None => Cow::Borrowed(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{"location":{"name":"London"},"current":{"temp_c":15.0,"temp_f":59.0,"condition":{"text":"Cloudy","code":1006}}}"#;

    #[test]
    fn decodes_full_body() {
        let record = decode_current(LONDON.as_bytes()).expect("valid body");
        assert_eq!(record, WeatherRecord::new("London", 15.0, 59.0, "Cloudy", 1006));
    }

    #[test]
    fn ignores_unknown_fields_and_accepts_integer_temperatures() {
        let body = r#"{
            "location": {"name": "Oslo", "country": "Norway", "localtime_epoch": 1700000000},
            "current": {"temp_c": -2, "temp_f": 28.4, "humidity": 80,
                        "condition": {"text": "Overcast", "code": 1009, "icon": "//cdn/1009.png"}}
        }"#;
        let record = decode_current(body.as_bytes()).expect("valid body");
        assert_eq!(record.city(), "Oslo");
        assert_eq!(record.temperature_celsius(), -2.0);
        assert_eq!(record.condition_code(), 1009);
    }

    #[test]
    fn missing_condition_code_is_a_decode_error() {
        let body = r#"{"location":{"name":"London"},"current":{"temp_c":15.0,"temp_f":59.0,"condition":{"text":"Cloudy"}}}"#;
        let err = decode_current(body.as_bytes()).unwrap_err();
        assert!(err.is_decode(), "got {err:?}");
    }

    #[test]
    fn mistyped_fields_are_decode_errors() {
        let body = r#"{"location":{"name":"London"},"current":{"temp_c":"15","temp_f":59.0,"condition":{"text":"Cloudy","code":1006}}}"#;
        assert!(decode_current(body.as_bytes()).unwrap_err().is_decode());

        let body = r#"{"location":{"name":"London"},"current":{"temp_c":15.0,"temp_f":59.0,"condition":{"text":"Cloudy","code":1006.5}}}"#;
        assert!(decode_current(body.as_bytes()).unwrap_err().is_decode());
    }

    #[test]
    fn empty_city_name_is_rejected() {
        let body = r#"{"location":{"name":"  "},"current":{"temp_c":15.0,"temp_f":59.0,"condition":{"text":"Cloudy","code":1006}}}"#;
        let err = decode_current(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("location.name is empty"));
    }

    #[test]
    fn non_json_is_a_decode_error() {
        assert!(decode_current(b"<html>Bad Gateway</html>").unwrap_err().is_decode());
    }

    #[test]
    fn request_url_percent_encodes_city_and_key() {
        let client = WeatherClient::with_endpoint("k&y".into(), "http://localhost/v1/current.json");
        assert_eq!(
            client.request_url("São Paulo"),
            "http://localhost/v1/current.json?key=k%26y&q=S%C3%A3o%20Paulo"
        );
    }

    #[test]
    fn default_endpoint_is_weatherapi() {
        let client = WeatherClient::new("KEY".into());
        assert_eq!(client.endpoint(), "https://api.weatherapi.com/v1/current.json");
    }

    #[tokio::test]
    async fn blank_city_is_rejected_without_network() {
        // Unroutable endpoint: reaching the network would yield a Network error instead.
        let client = WeatherClient::with_endpoint("KEY".into(), "http://127.0.0.1:9/current.json");
        let err = client.fetch("   \t").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
