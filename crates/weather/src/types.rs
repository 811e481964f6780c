//! Weather data types.

use serde::{Deserialize, Serialize};

/// Current conditions for a location, normalized to metric units.
///
/// Created per query by the resolver, consumed once by the answer composer,
/// then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Resolved location name as reported by the weather service
    pub location: String,

    /// Temperature in °C
    pub temperature: f32,

    /// Perceived temperature in °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f32>,

    /// Short condition description (e.g., "light rain")
    pub condition: String,

    /// Relative humidity in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u32>,

    /// Wind speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f32>,
}
