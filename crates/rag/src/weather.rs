//! Live weather augmentation.
//!
//! A location-bearing query gets one extra context item describing the
//! current weather there. Any failure leaves the context untouched.

use crate::types::{ContextItem, SourceOutcome};
use agrodoc_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_WEATHER_URL: &str = "http://api.openweathermap.org";

/// Metadata source tag for weather context.
pub const WEATHER_SOURCE: &str = "weather_api";

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub description: String,
    /// Degrees Celsius
    pub temperature: f64,
}

impl WeatherReading {
    pub fn to_context_item(&self, location: &str) -> ContextItem {
        ContextItem::from_source(
            format!(
                "Weather in {}: {}, Temp: {}°C",
                location, self.description, self.temperature
            ),
            WEATHER_SOURCE,
        )
    }
}

/// Source of current weather readings.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn current(&self, location: &str) -> AppResult<WeatherReading>;
}

/// OpenWeatherMap current-weather client (metric units).
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_WEATHER_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn convert_response(body: CurrentWeather) -> AppResult<WeatherReading> {
        let condition = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Weather("No weather conditions in response".to_string()))?;

        Ok(WeatherReading {
            description: condition.description,
            temperature: body.main.temp,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    fn provider_name(&self) -> &str {
        "openweathermap"
    }

    async fn current(&self, location: &str) -> AppResult<WeatherReading> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Weather("WEATHER_API_KEY is not set".to_string()))?;

        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!("Fetching weather for '{}'", location);

        let response = self
            .client
            .get(&url)
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| AppError::Weather(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Weather(format!(
                "Weather API error ({}): {}",
                status, error_text
            )));
        }

        let body: CurrentWeather = response
            .json()
            .await
            .map_err(|e| AppError::Weather(format!("Failed to parse response: {}", e)))?;

        Self::convert_response(body)
    }
}

/// Turns a weather reading into context, or reports it unavailable.
pub struct WeatherAugmenter {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherAugmenter {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, location: &str) -> SourceOutcome<ContextItem> {
        match self.provider.current(location).await {
            Ok(reading) => SourceOutcome::Available(reading.to_context_item(location)),
            Err(e) => {
                tracing::error!("Error fetching weather data: {}", e);
                SourceOutcome::Unavailable(e.to_string())
            }
        }
    }
}
