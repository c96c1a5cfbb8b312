//! Weather snapshot and feels-like temperature
//!
//! Feels-like uses a single heuristic: humid heat adds up to a few degrees,
//! cold subtracts a fixed offset. Wind speed is recorded but not used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Above this temperature (°C) humidity starts to raise feels-like
const HUMID_HEAT_THRESHOLD: f64 = 26.0;

/// Relative humidity (%) above which humid heat applies
const HUMIDITY_THRESHOLD: f64 = 60.0;

/// Below this temperature (°C) the cold offset applies
const COLD_THRESHOLD: f64 = 10.0;

const COLD_OFFSET: f64 = 2.0;

/// Immutable weather observation used as recommendation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// Air temperature in °C
    pub temperature: f64,
    /// Perceived temperature in °C
    pub feels_like: f64,
    /// Textual condition ("晴", "light rain", ...)
    pub condition: String,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Build a snapshot from raw observations, deriving feels-like
    pub fn observe(
        city: impl Into<String>,
        temperature: f64,
        condition: impl Into<String>,
        humidity: Option<f64>,
        wind_speed: Option<f64>,
    ) -> Self {
        Self {
            city: city.into(),
            temperature,
            feels_like: feels_like(temperature, humidity),
            condition: condition.into(),
            wind_speed,
            humidity,
            observed_at: Utc::now(),
        }
    }

    /// True when the condition text contains any of `keywords`
    pub fn condition_matches(&self, keywords: &[String]) -> bool {
        let condition = self.condition.to_lowercase();
        keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| condition.contains(&k.to_lowercase()))
    }
}

/// Feels-like temperature, rounded to 0.1 °C
pub fn feels_like(temperature: f64, humidity: Option<f64>) -> f64 {
    let humidity = humidity.unwrap_or(0.0);
    let value = if temperature > HUMID_HEAT_THRESHOLD && humidity > HUMIDITY_THRESHOLD {
        temperature + ((humidity - HUMIDITY_THRESHOLD) / 100.0) * 3.0
    } else if temperature < COLD_THRESHOLD {
        temperature - COLD_OFFSET
    } else {
        temperature
    };
    (value * 10.0).round() / 10.0
}
