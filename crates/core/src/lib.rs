//! Core units, constants, and shared primitives for the sweep orchestrator workspace.

pub mod conditions;
pub mod geodesy;

pub use conditions::LaunchConditions;
pub use geodesy::{Displacement, WorldCoordinate};

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Mean Earth radius used by the haversine distance (m).
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
    /// Metres spanned by one degree of latitude ("standard figure").
    pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_325.0;
    /// Metres spanned by one degree of longitude at the equator.
    pub const METERS_PER_DEGREE_LONGITUDE_AT_EQUATOR: f64 = 111_050.0;
    /// Specific gas constant for dry air, J/(kg·K).
    pub const R_DRY_AIR: f64 = 287.052_87;
    /// ISA sea-level pressure (Pa).
    pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;
    /// ISA sea-level temperature (K).
    pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert degrees to radians (exact `× π/180`).
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }

    /// Convert hectopascals to pascals.
    #[inline]
    pub fn hpa_to_pa(v: f64) -> f64 {
        v * 100.0
    }
}

/// Runtime policies shared between the engine boundary and configuration.
pub mod runtime {
    use serde::{Deserialize, Serialize};

    /// What the flight engine may do with its own diagnostic output.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum EngineLog {
        /// Engine chatter is discarded at the engine boundary.
        #[default]
        Suppressed,
        /// Engine chatter is forwarded to stderr.
        Forwarded,
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in the launch-site East-North-Up frame.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }
}
