//! Weather API client: location string in, forecast snapshot out.
//!
//! Speaks an OpenWeatherMap-style current-weather endpoint in metric
//! units. The snapshot shape is shared with the fallback generator so
//! real and synthesized data flow through the same scoring logic.

use crate::http::HttpClient;
use planwise_core::{AgentConfig, AgentError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Point-in-time weather for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Short condition description ("clear sky", "light rain", ...)
    pub conditions: String,
}

/// Client for the upstream weather API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Build a client from configuration. Returns `None` when no API key
    /// is configured.
    pub fn from_config(config: &AgentConfig, http: HttpClient) -> Option<Self> {
        let api_key = config.weather_api_key.clone()?;
        Some(Self {
            http,
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch the current weather for a location.
    pub async fn current(&self, location: &str) -> Result<WeatherSnapshot, AgentError> {
        let url = format!("{}/weather", self.base_url);
        debug!(%location, "fetching current weather");

        let response = self
            .http
            .execute_with_retry(|| {
                self.http.inner().get(&url).query(&[
                    ("q", location),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::UpstreamTransport(format!(
                "weather API error (status {status}) for '{location}'"
            )));
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            main: MainBlock,
            wind: WindBlock,
            #[serde(default)]
            weather: Vec<ConditionBlock>,
        }
        #[derive(Deserialize)]
        struct MainBlock {
            temp: f64,
            humidity: f64,
        }
        #[derive(Deserialize)]
        struct WindBlock {
            speed: f64,
        }
        #[derive(Deserialize)]
        struct ConditionBlock {
            description: String,
        }

        let data: ApiResponse = response.json().await.map_err(|e| {
            AgentError::UpstreamTransport(format!("malformed weather envelope: {e}"))
        })?;

        Ok(WeatherSnapshot {
            temperature_c: data.main.temp,
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
            conditions: data
                .weather
                .first()
                .map(|c| c.description.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Lightweight availability probe; never retried.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/weather", self.base_url);
        let request = self
            .http
            .inner()
            .get(&url)
            .query(&[("q", "London"), ("appid", self.api_key.as_str())]);
        match self.http.probe(request).await {
            Ok(status) => status.is_success(),
            Err(_) => false,
        }
    }
}
