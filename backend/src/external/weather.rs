//! Weather API client for fetching current conditions
//!
//! Integrates with the OpenWeatherMap current-weather-by-city endpoint and
//! reduces the response to the four readings the advisor needs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::WeatherReading;
use thiserror::Error;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Why a weather fetch failed
///
/// All variants are reported to users with the same message; the reason is
/// kept for logs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeatherFetchError {
    #[error("weather request timed out")]
    Timeout,

    #[error("weather request failed: {0}")]
    Transport(String),

    #[error("place not found: {0}")]
    PlaceNotFound(String),

    #[error("weather API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed weather response: {0}")]
    Malformed(String),
}

impl WeatherFetchError {
    pub fn reason(&self) -> &'static str {
        match self {
            WeatherFetchError::Timeout => "timeout",
            WeatherFetchError::Transport(_) => "transport",
            WeatherFetchError::PlaceNotFound(_) => "place_not_found",
            WeatherFetchError::Upstream { .. } => "upstream",
            WeatherFetchError::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for WeatherFetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WeatherFetchError::Timeout
        } else {
            WeatherFetchError::Transport(e.to_string())
        }
    }
}

/// Source of current weather for a place
#[axum::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(&self, place: &str) -> Result<WeatherReading, WeatherFetchError>;
}

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
    rain: Option<OWMRain>,
    dt: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl WeatherClient {
    /// Create a new WeatherClient with an explicit request timeout
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration; the API key must be set
    pub fn from_config(config: &WeatherConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Weather API key not configured".to_string(),
            ));
        }
        Self::new(
            config.api_key.clone(),
            config.api_endpoint.clone(),
            config.timeout(),
        )
    }

    /// Fetch current weather conditions by city name
    pub async fn get_current_weather(&self, place: &str) -> Result<WeatherReading, WeatherFetchError> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WeatherFetchError::PlaceNotFound(place.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherFetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let data: OWMCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherFetchError::Malformed(e.to_string()))?;

        convert_current_response(place, data)
    }
}

#[axum::async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch_weather(&self, place: &str) -> Result<WeatherReading, WeatherFetchError> {
        self.get_current_weather(place).await
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(
    place: &str,
    data: OWMCurrentResponse,
) -> Result<WeatherReading, WeatherFetchError> {
    let rainfall = data.rain.and_then(|r| r.one_hour).unwrap_or(0.0);
    let observed_at = data
        .dt
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
        .unwrap_or_else(Utc::now);
    let name = data
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| place.to_string());

    let (humidity, temperature) = (data.main.humidity, data.main.temp);
    WeatherReading::from_observation(name, temperature, humidity, rainfall, observed_at).ok_or_else(|| {
        WeatherFetchError::Malformed(format!(
            "humidity {} or rainfall {} out of range",
            humidity, rainfall
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn parse(body: &str) -> Result<OWMCurrentResponse, serde_json::Error> {
        serde_json::from_str(body)
    }

    #[test]
    fn converts_full_response() {
        let data = parse(
            r#"{"main": {"temp": 24.5, "humidity": 80, "pressure": 1012},
                "rain": {"1h": 2.5}, "dt": 1700000000, "name": "Pune"}"#,
        )
        .unwrap();
        let reading = convert_current_response("pune", data).unwrap();
        assert_eq!(reading.place, "Pune");
        assert_eq!(reading.temperature_celsius, 24.5);
        assert_eq!(reading.humidity_percent, 80.0);
        assert_eq!(reading.rainfall_mm, 2.5);
        assert_eq!(reading.soil_moisture, Decimal::from_str("1.48").unwrap());
        assert_eq!(reading.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn missing_rain_defaults_to_zero() {
        let data = parse(r#"{"main": {"temp": 30.0, "humidity": 50}}"#).unwrap();
        let reading = convert_current_response("Jaipur", data).unwrap();
        assert_eq!(reading.rainfall_mm, 0.0);
        assert_eq!(reading.place, "Jaipur");
        assert_eq!(reading.soil_moisture, Decimal::from_str("0.3").unwrap());
    }

    #[test]
    fn rain_without_one_hour_defaults_to_zero() {
        let data = parse(r#"{"main": {"temp": 30.0, "humidity": 50}, "rain": {"3h": 4.0}}"#).unwrap();
        assert_eq!(convert_current_response("Goa", data).unwrap().rainfall_mm, 0.0);
    }

    #[test]
    fn out_of_range_readings_are_malformed() {
        let data = parse(r#"{"main": {"temp": 30.0, "humidity": 50}, "rain": {"1h": 1e30}}"#).unwrap();
        assert!(matches!(
            convert_current_response("Goa", data),
            Err(WeatherFetchError::Malformed(_))
        ));
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        assert!(parse(r#"{"main": {"humidity": 50}}"#).is_err());
        assert!(parse(r#"{"main": {"temp": 20.0}}"#).is_err());
        assert!(parse(r#"{"cod": "404", "message": "city not found"}"#).is_err());
    }

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let config = WeatherConfig {
            api_endpoint: "http://localhost".to_string(),
            api_key: "  ".to_string(),
            timeout_secs: 5,
        };
        assert!(matches!(
            WeatherClient::from_config(&config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn failure_reasons_are_stable() {
        assert_eq!(WeatherFetchError::Timeout.reason(), "timeout");
        assert_eq!(
            WeatherFetchError::PlaceNotFound("x".to_string()).reason(),
            "place_not_found"
        );
    }
}
