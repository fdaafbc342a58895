//! Weather payloads and their mapping onto launch conditions.
//!
//! The payload is the nested document returned by common current-weather
//! APIs. Only six keys are read:
//!
//! | key            | target field                  |
//! |----------------|-------------------------------|
//! | `main.pressure`| `pressure`                    |
//! | `main.temp`    | `temperature`                 |
//! | `wind.speed`   | `wind_speed_m_s`              |
//! | `wind.deg`     | `wind_direction_deg`          |
//! | `coord.lat`    | `launch_site.latitude_deg`    |
//! | `coord.lon`    | `launch_site.longitude_deg`   |
//!
//! Values are copied as-is; physical plausibility is the engine's concern.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use sweep_core::units::hpa_to_pa;
use sweep_core::{LaunchConditions, WorldCoordinate};
use thiserror::Error;

pub const PRESSURE_KEY: &str = "main.pressure";
pub const TEMPERATURE_KEY: &str = "main.temp";
pub const WIND_SPEED_KEY: &str = "wind.speed";
pub const WIND_DIRECTION_KEY: &str = "wind.deg";
pub const LATITUDE_KEY: &str = "coord.lat";
pub const LONGITUDE_KEY: &str = "coord.lon";

/// A required weather key was absent, had an absent parent object, or was
/// not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("weather payload is missing numeric field `{key}`")]
pub struct MissingFieldError {
    pub key: &'static str,
}

/// Errors raised while reading a weather payload from text or disk.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("failed to read weather payload: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse weather payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Unit of the payload's `main.pressure` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    /// Copy the value unchanged.
    #[default]
    Pascal,
    /// Multiply by 100 before handing it to the engine.
    Hectopascal,
}

/// Raw weather document as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload(Value);

impl WeatherPayload {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WeatherError> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Extract the six weather fields, failing on the first one missing.
    pub fn reading(&self) -> Result<WeatherReading, MissingFieldError> {
        Ok(WeatherReading {
            pressure: self.number(PRESSURE_KEY)?,
            temperature: self.number(TEMPERATURE_KEY)?,
            wind_speed_m_s: self.number(WIND_SPEED_KEY)?,
            wind_direction_deg: self.number(WIND_DIRECTION_KEY)?,
            site: WorldCoordinate {
                latitude_deg: self.number(LATITUDE_KEY)?,
                longitude_deg: self.number(LONGITUDE_KEY)?,
            },
        })
    }

    fn number(&self, key: &'static str) -> Result<f64, MissingFieldError> {
        key.split('.')
            .try_fold(&self.0, |node, part| node.as_object()?.get(part))
            .and_then(Value::as_f64)
            .ok_or(MissingFieldError { key })
    }
}

impl FromStr for WeatherPayload {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(serde_json::from_str(s)?))
    }
}

impl From<Value> for WeatherPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The fields read from a payload, before unit mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub pressure: f64,
    pub temperature: f64,
    pub wind_speed_m_s: f64,
    pub wind_direction_deg: f64,
    pub site: WorldCoordinate,
}

/// Overlay the payload onto `conditions`, copying pressure unchanged.
pub fn apply(
    payload: &WeatherPayload,
    conditions: LaunchConditions,
) -> Result<LaunchConditions, MissingFieldError> {
    apply_with_unit(payload, conditions, PressureUnit::Pascal)
}

/// Overlay the payload onto `conditions`, converting pressure from `unit`.
pub fn apply_with_unit(
    payload: &WeatherPayload,
    conditions: LaunchConditions,
    unit: PressureUnit,
) -> Result<LaunchConditions, MissingFieldError> {
    let reading = payload.reading()?;
    let pressure = match unit {
        PressureUnit::Pascal => reading.pressure,
        PressureUnit::Hectopascal => hpa_to_pa(reading.pressure),
    };
    Ok(LaunchConditions {
        launch_site: reading.site,
        wind_speed_m_s: reading.wind_speed_m_s,
        wind_direction_deg: reading.wind_direction_deg,
        pressure,
        temperature: reading.temperature,
        ..conditions
    })
}
