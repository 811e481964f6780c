//! Weather service abstraction and OpenWeatherMap client.

use crate::types::WeatherReading;
use serde::Deserialize;
use skydoc_core::{AppError, AppResult};
use std::time::Duration;

/// Trait for current-weather lookups.
///
/// Keyed by a single free-text location string; implementations must
/// request metric units and surface a single upstream failure immediately —
/// no retries. The orchestrator decides how failures degrade.
#[async_trait::async_trait]
pub trait WeatherService: Send + Sync {
    /// Fetch current conditions for the location.
    async fn current(&self, location: &str) -> AppResult<WeatherReading>;
}

/// OpenWeatherMap current-weather response, the fields we consume.
#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f32,
    #[serde(default)]
    feels_like: Option<f32>,
    #[serde(default)]
    humidity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: Option<f32>,
}

/// OpenWeatherMap HTTP client.
pub struct OpenWeatherClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    /// Create a new client.
    ///
    /// `endpoint` is the full current-weather URL (e.g.,
    /// `https://api.openweathermap.org/data/2.5/weather`).
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    fn normalize(&self, response: OwmResponse) -> AppResult<WeatherReading> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| {
                AppError::Upstream("Weather response contained no condition".to_string())
            })?;

        Ok(WeatherReading {
            location: response.name,
            temperature: response.main.temp,
            feels_like: response.main.feels_like,
            condition,
            humidity: response.main.humidity,
            wind_speed: response.wind.and_then(|w| w.speed),
        })
    }
}

#[async_trait::async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current(&self, location: &str) -> AppResult<WeatherReading> {
        tracing::debug!(location, "Fetching current weather");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream(format!(
                "Weather service error ({}): {}",
                status, error_text
            )));
        }

        let body: OwmResponse = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Malformed weather response: {}", e))
        })?;

        self.normalize(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenWeatherClient {
        OpenWeatherClient::new(
            "https://api.openweathermap.org/data/2.5/weather",
            "test-key",
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_full_response() {
        let response: OwmResponse = serde_json::from_str(
            r#"{
                "name": "Paris",
                "main": {"temp": 18.3, "feels_like": 17.9, "humidity": 64},
                "weather": [{"description": "light rain"}],
                "wind": {"speed": 4.2}
            }"#,
        )
        .unwrap();

        let reading = client().normalize(response).unwrap();
        assert_eq!(reading.location, "Paris");
        assert_eq!(reading.temperature, 18.3);
        assert_eq!(reading.feels_like, Some(17.9));
        assert_eq!(reading.condition, "light rain");
        assert_eq!(reading.humidity, Some(64));
        assert_eq!(reading.wind_speed, Some(4.2));
    }

    #[test]
    fn test_normalize_minimal_response() {
        let response: OwmResponse = serde_json::from_str(
            r#"{
                "name": "Oslo",
                "main": {"temp": -3.0},
                "weather": [{"description": "snow"}]
            }"#,
        )
        .unwrap();

        let reading = client().normalize(response).unwrap();
        assert_eq!(reading.location, "Oslo");
        assert_eq!(reading.feels_like, None);
        assert_eq!(reading.wind_speed, None);
    }

    #[test]
    fn test_missing_condition_is_upstream_error() {
        let response: OwmResponse = serde_json::from_str(
            r#"{"name": "Nowhere", "main": {"temp": 10.0}, "weather": []}"#,
        )
        .unwrap();

        let err = client().normalize(response).unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
