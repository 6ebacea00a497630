//! Weather data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current conditions for a place, fetched fresh per request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    pub place: String,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    /// Rainfall over the last hour (mm); 0 when the provider reports none
    pub rainfall_mm: f64,
    /// Derived estimate, see [`derive_soil_moisture`]
    pub soil_moisture: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Build a reading from raw provider values, deriving soil moisture
    ///
    /// `None` when humidity or rainfall has no `Decimal` representation.
    pub fn from_observation(
        place: impl Into<String>,
        temperature_celsius: f64,
        humidity_percent: f64,
        rainfall_mm: f64,
        observed_at: DateTime<Utc>,
    ) -> Option<Self> {
        let soil_moisture = derive_soil_moisture(humidity_percent, rainfall_mm)?;
        Some(Self {
            place: place.into(),
            temperature_celsius,
            humidity_percent,
            rainfall_mm,
            soil_moisture,
            observed_at,
        })
    }
}

/// Soil moisture proxy: `0.6 * humidity/100 + 0.4 * rain_1h`, rounded to 3 dp.
///
/// This is a heuristic blending air humidity with recent rainfall. It is not
/// a sensor reading and has no physical unit.
pub fn derive_soil_moisture(humidity_percent: f64, rainfall_mm: f64) -> Option<Decimal> {
    let humidity = Decimal::from_f64_retain(humidity_percent)?;
    let rain = Decimal::from_f64_retain(rainfall_mm)?;
    let moisture = (humidity / Decimal::ONE_HUNDRED)
        .checked_mul(Decimal::new(6, 1))?
        .checked_add(rain.checked_mul(Decimal::new(4, 1))?)?;
    Some(moisture.round_dp(3))
}
