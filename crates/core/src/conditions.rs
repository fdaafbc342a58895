//! Launch conditions handed to the flight engine for a single run.

use serde::{Deserialize, Serialize};

use crate::constants::{SEA_LEVEL_PRESSURE_PA, SEA_LEVEL_TEMPERATURE_K};
use crate::geodesy::WorldCoordinate;
use crate::units::{deg_to_rad, rad_to_deg};

/// Complete set of per-run inputs.
///
/// Values are built fresh for every sweep step and never mutated once handed
/// to the engine. Angles follow the launch-rod convention: `launch_angle_rad`
/// is measured from vertical, `launch_direction_deg` is the compass azimuth
/// the rod leans towards. Wind direction is meteorological (the direction the
/// wind blows *from*).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConditions {
    pub launch_angle_rad: f64,
    pub launch_direction_deg: f64,
    pub launch_site: WorldCoordinate,
    pub wind_speed_m_s: f64,
    pub wind_direction_deg: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl Default for LaunchConditions {
    fn default() -> Self {
        Self {
            launch_angle_rad: 0.0,
            launch_direction_deg: 0.0,
            launch_site: WorldCoordinate::default(),
            wind_speed_m_s: 0.0,
            wind_direction_deg: 0.0,
            pressure: SEA_LEVEL_PRESSURE_PA,
            temperature: SEA_LEVEL_TEMPERATURE_K,
        }
    }
}

impl LaunchConditions {
    /// Copy of these conditions with the launch angle set from degrees.
    pub fn with_launch_angle_deg(self, angle_deg: f64) -> Self {
        Self {
            launch_angle_rad: deg_to_rad(angle_deg),
            ..self
        }
    }

    /// Launch angle in degrees.
    pub fn launch_angle_deg(&self) -> f64 {
        rad_to_deg(self.launch_angle_rad)
    }

    /// Wind velocity as (east, north) components in m/s.
    pub fn wind_velocity_en(&self) -> (f64, f64) {
        let towards = (self.wind_direction_deg + 180.0).to_radians();
        (
            self.wind_speed_m_s * towards.sin(),
            self.wind_speed_m_s * towards.cos(),
        )
    }
}
