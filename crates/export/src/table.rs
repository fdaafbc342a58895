//! Flat CSV table with one row per successful launch.

use std::io::Write;

use serde::Serialize;
use sweep_runner::SimulationRecord;

#[derive(Debug, Serialize)]
struct LaunchRow<'a> {
    simulation: &'a str,
    launch_index: usize,
    launch_angle_deg: f64,
    max_altitude_m: f64,
    flight_time_s: f64,
    landing_east_m: f64,
    landing_north_m: f64,
    landing_distance_m: f64,
    landing_latitude_deg: f64,
    landing_longitude_deg: f64,
}

/// Write every result of every record, header first.
pub fn write_launches<W: Write>(writer: W, records: &[SimulationRecord]) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        for (index, result) in record.results.iter().enumerate() {
            let displacement = result.landing_displacement;
            csv.serialize(LaunchRow {
                simulation: &record.name,
                launch_index: index + 1,
                launch_angle_deg: result.launch_angle_deg,
                max_altitude_m: result.max_altitude_m,
                flight_time_s: result.flight_time_s,
                landing_east_m: displacement.east_m,
                landing_north_m: displacement.north_m,
                landing_distance_m: displacement.distance_m(),
                landing_latitude_deg: result.landing.latitude_deg,
                landing_longitude_deg: result.landing.longitude_deg,
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}
