//! Conversions between angular (latitude/longitude) and linear (metre) displacement.
//!
//! [`displacement_meters`] is the canonical method used for every landing
//! displacement in this workspace. It is a flat-earth approximation that is
//! accurate for sub-100 km displacements and does not handle the antimeridian
//! or the poles. [`great_circle_distance_meters`] is the haversine
//! alternative; nothing in the sweep or the report calls it implicitly.

use serde::{Deserialize, Serialize};

use crate::constants::{
    EARTH_RADIUS_M, METERS_PER_DEGREE_LATITUDE, METERS_PER_DEGREE_LONGITUDE_AT_EQUATOR,
};

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldCoordinate {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl WorldCoordinate {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

/// Local horizontal displacement in metres (East-North).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Displacement {
    pub east_m: f64,
    pub north_m: f64,
}

impl Displacement {
    pub fn new(east_m: f64, north_m: f64) -> Self {
        Self { east_m, north_m }
    }

    /// Horizontal distance covered by the displacement.
    pub fn distance_m(&self) -> f64 {
        self.east_m.hypot(self.north_m)
    }

    /// Component-wise negation.
    pub fn reversed(&self) -> Self {
        Self {
            east_m: -self.east_m,
            north_m: -self.north_m,
        }
    }
}

/// Below this many metres per degree of longitude the origin counts as a pole.
const POLAR_SCALE_FLOOR: f64 = 1e-6;

fn meters_per_degree_longitude(latitude_deg: f64) -> f64 {
    METERS_PER_DEGREE_LONGITUDE_AT_EQUATOR * latitude_deg.to_radians().cos()
}

/// Flat-earth displacement from `from` to `to`.
///
/// The longitude scale is corrected by the cosine of `from`'s latitude.
pub fn displacement_meters(from: WorldCoordinate, to: WorldCoordinate) -> Displacement {
    let d_lat = to.latitude_deg - from.latitude_deg;
    let d_lon = to.longitude_deg - from.longitude_deg;
    Displacement {
        east_m: d_lon * meters_per_degree_longitude(from.latitude_deg),
        north_m: d_lat * METERS_PER_DEGREE_LATITUDE,
    }
}

/// Inverse of [`displacement_meters`]: the coordinate reached by moving
/// `displacement` away from `origin`.
///
/// At the poles the longitude scale collapses to zero; the longitude is then
/// left unchanged.
pub fn offset_coordinate(origin: WorldCoordinate, displacement: Displacement) -> WorldCoordinate {
    let lon_scale = meters_per_degree_longitude(origin.latitude_deg);
    let d_lon = if lon_scale.abs() > POLAR_SCALE_FLOOR {
        displacement.east_m / lon_scale
    } else {
        0.0
    };
    WorldCoordinate {
        latitude_deg: origin.latitude_deg + displacement.north_m / METERS_PER_DEGREE_LATITUDE,
        longitude_deg: origin.longitude_deg + d_lon,
    }
}

/// Haversine great-circle distance in metres on a spherical Earth of radius
/// 6 371 km.
pub fn great_circle_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}
