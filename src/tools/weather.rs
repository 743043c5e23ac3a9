//! Weather lookup adapters.

use crate::config::{WeatherSettings, WeatherUnits};
use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub condition: String,
    pub humidity: u32,
}

impl WeatherReport {
    /// Human-readable summary used as the final answer.
    pub fn summary(&self, units: WeatherUnits) -> String {
        format!(
            "Weather in {}:\n- Condition: {}\n- Temperature: {}{}\n- Humidity: {}%",
            self.city,
            self.condition,
            self.temperature,
            units.temperature_symbol(),
            self.humidity
        )
    }
}

/// Trait for weather data sources.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current conditions for a city.
    async fn get_weather(&self, city: &str) -> Result<WeatherReport>;

    /// Units the readings are reported in.
    fn units(&self) -> WeatherUnits {
        WeatherUnits::Metric
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmError {
    message: Option<String>,
}

/// OpenWeatherMap current weather client.
pub struct OpenWeatherMap {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    units: WeatherUnits,
}

impl OpenWeatherMap {
    /// Create a client from settings. Requires an API key.
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            WaypointError::Config(
                "OpenWeatherMap API key not set. Set weather.api_key or OPENWEATHER_API_KEY"
                    .to_string(),
            )
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: settings.endpoint.clone(),
            api_key,
            units: settings.units,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMap {
    #[instrument(skip(self))]
    async fn get_weather(&self, city: &str) -> Result<WeatherReport> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WaypointError::InvalidInput("City cannot be empty".to_string()));
        }

        debug!("Requesting current weather");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<OwmError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Weather API error".to_string());
            warn!(status = %status, "Weather API returned error: {}", message);
            return Err(WaypointError::Weather(message));
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| {
                WaypointError::Weather(format!("Failed to parse weather response: {}", e))
            })?;

        let condition = body
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(WeatherReport {
            city: city.to_string(),
            temperature: body.main.temp,
            condition,
            humidity: body.main.humidity,
        })
    }

    fn units(&self) -> WeatherUnits {
        self.units
    }
}

/// Randomized weather for offline use.
pub struct SimulatedWeather;

impl SimulatedWeather {
    pub const CONDITIONS: [&'static str; 5] = ["sunny", "cloudy", "rainy", "stormy", "windy"];
}

#[async_trait]
impl WeatherSource for SimulatedWeather {
    async fn get_weather(&self, city: &str) -> Result<WeatherReport> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WaypointError::InvalidInput("City cannot be empty".to_string()));
        }

        let mut rng = rand::rng();
        let condition = Self::CONDITIONS
            .choose(&mut rng)
            .copied()
            .unwrap_or("sunny");

        Ok(WeatherReport {
            city: city.to_string(),
            temperature: rng.random_range(18..=35) as f64,
            condition: condition.to_string(),
            humidity: rng.random_range(40..=90),
        })
    }
}
