//! JSON report of aggregated sweep records.
//!
//! Layout: one object per record keyed by simulation name, holding one
//! `launchN` entry per result (`N` is the 1-based position, not the angle).
//! Keys keep input order. Duplicate names get ` (2)`, ` (3)`, … suffixes and
//! non-finite numbers are written as `null`.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use sweep_runner::{FlightResult, SimulationRecord};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchEntry {
    launch_angle: Option<f64>,
    launch_statistics: LaunchStatistics,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchStatistics {
    max_altitude: Option<f64>,
    flight_time: Option<f64>,
    landing_displacement: DisplacementEntry,
    landing_coordinate: CoordinateEntry,
}

#[derive(Serialize)]
struct DisplacementEntry {
    east: Option<f64>,
    north: Option<f64>,
    distance: Option<f64>,
}

#[derive(Serialize)]
struct CoordinateEntry {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl From<&FlightResult> for LaunchEntry {
    fn from(result: &FlightResult) -> Self {
        let displacement = result.landing_displacement;
        LaunchEntry {
            launch_angle: finite(result.launch_angle_deg),
            launch_statistics: LaunchStatistics {
                max_altitude: finite(result.max_altitude_m),
                flight_time: finite(result.flight_time_s),
                landing_displacement: DisplacementEntry {
                    east: finite(displacement.east_m),
                    north: finite(displacement.north_m),
                    distance: finite(displacement.distance_m()),
                },
                landing_coordinate: CoordinateEntry {
                    latitude: finite(result.landing.latitude_deg),
                    longitude: finite(result.landing.longitude_deg),
                },
            },
        }
    }
}

/// Build the report as a JSON value.
pub fn to_value(records: &[SimulationRecord]) -> Value {
    let mut used = HashSet::new();
    let mut report = Map::new();
    for record in records {
        let key = unique_key(&record.name, &mut used);
        report.insert(key, Value::Object(launches(&record.results)));
    }
    Value::Object(report)
}

/// Render the report as pretty-printed JSON.
pub fn serialize(records: &[SimulationRecord]) -> String {
    serde_json::to_string_pretty(&to_value(records)).unwrap_or_else(|_| "{}".to_string())
}

fn launches(results: &[FlightResult]) -> Map<String, Value> {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            let entry = serde_json::to_value(LaunchEntry::from(result)).unwrap_or(Value::Null);
            (format!("launch{}", index + 1), entry)
        })
        .collect()
}

fn unique_key(name: &str, used: &mut HashSet<String>) -> String {
    let mut key = name.to_string();
    let mut suffix = 2;
    while used.contains(&key) {
        key = format!("{name} ({suffix})");
        suffix += 1;
    }
    used.insert(key.clone());
    key
}
