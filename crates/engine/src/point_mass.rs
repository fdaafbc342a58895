//! Reference point-mass engine.
//!
//! A 3-DOF stand-in for a real flight engine: constant thrust for the burn,
//! linear propellant depletion, quadratic drag against the air-relative
//! velocity, and an exponential atmosphere anchored at the launch pressure
//! and temperature. The rocket slides along the launch rod until it has
//! travelled the rod length, then thrusts along its air-relative velocity.
//! Integration is fixed-step RK4 in the launch-site ENU frame.

use std::sync::OnceLock;
use std::time::Instant;

use sweep_core::constants::{G0, R_DRY_AIR};
use sweep_core::geodesy::{Displacement, offset_coordinate};
use sweep_core::LaunchConditions;
use sweep_core::vector::{Vector3, add, dot, norm, scale, sub};

use crate::{
    BootstrapError, EngineError, EngineLog, FlightEngine, FlightTelemetry, TelemetrySample,
};

/// Scale height of the isothermal atmosphere approximation (m).
const SCALE_HEIGHT_M: f64 = 8_500.0;
pub const DEFAULT_ROD_LENGTH_M: f64 = 1.0;
/// Integration steps between deadline checks.
const DEADLINE_CHECK_STEPS: u64 = 256;

/// Rocket parameters understood by [`PointMassEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct PointMassRocket {
    pub dry_mass_kg: f64,
    pub propellant_mass_kg: f64,
    pub thrust_newtons: f64,
    pub burn_time_s: f64,
    pub drag_coefficient: f64,
    pub reference_area_m2: f64,
    pub rod_length_m: f64,
}

impl PointMassRocket {
    pub fn total_mass_kg(&self) -> f64 {
        self.dry_mass_kg + self.propellant_mass_kg
    }

    fn mass_at(&self, time_s: f64) -> f64 {
        if time_s >= self.burn_time_s || self.burn_time_s <= 0.0 {
            self.dry_mass_kg
        } else {
            self.total_mass_kg() - self.propellant_mass_kg * time_s / self.burn_time_s
        }
    }

    fn thrust_at(&self, time_s: f64) -> f64 {
        if time_s < self.burn_time_s {
            self.thrust_newtons
        } else {
            0.0
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("dry_mass_kg", self.dry_mass_kg),
            ("propellant_mass_kg", self.propellant_mass_kg),
            ("thrust_newtons", self.thrust_newtons),
            ("burn_time_s", self.burn_time_s),
            ("drag_coefficient", self.drag_coefficient),
            ("reference_area_m2", self.reference_area_m2),
            ("rod_length_m", self.rod_length_m),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Simulation(format!(
                    "rocket parameter {name} must be a non-negative number (got {value})"
                )));
            }
        }
        if self.dry_mass_kg <= 0.0 {
            return Err(EngineError::Simulation("rocket dry mass must be positive".into()));
        }
        Ok(())
    }
}

impl Default for PointMassRocket {
    fn default() -> Self {
        Self {
            dry_mass_kg: 0.5,
            propellant_mass_kg: 0.1,
            thrust_newtons: 60.0,
            burn_time_s: 1.5,
            drag_coefficient: 0.45,
            reference_area_m2: 0.0013,
            rod_length_m: DEFAULT_ROD_LENGTH_M,
        }
    }
}

/// Fixed-step point-mass engine.
#[derive(Debug)]
pub struct PointMassEngine {
    pub dt: f64,
    pub max_time: f64,
    log: OnceLock<EngineLog>,
}

impl Default for PointMassEngine {
    fn default() -> Self {
        Self::new(0.01, 600.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    pos: Vector3,
    vel: Vector3,
    /// Latched once the rocket has travelled the rod length; never reset.
    off_rod: bool,
}

#[derive(Debug, Clone, Copy)]
struct Deriv {
    dpos: Vector3,
    dvel: Vector3,
}

struct FlightModel<'a> {
    rocket: &'a PointMassRocket,
    rod_dir: Vector3,
    wind: Vector3,
    surface_density: f64,
}

impl PointMassEngine {
    pub fn new(dt: f64, max_time: f64) -> Self {
        Self {
            dt,
            max_time,
            log: OnceLock::new(),
        }
    }

    fn forwarding(&self) -> bool {
        matches!(self.log.get(), Some(EngineLog::Forwarded))
    }
}

impl FlightEngine for PointMassEngine {
    type Design = PointMassRocket;

    fn bootstrap(&self, log: EngineLog) -> Result<(), BootstrapError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(BootstrapError::new(format!(
                "integration step must be positive (got {})",
                self.dt
            )));
        }
        if !(self.max_time.is_finite() && self.max_time > self.dt) {
            return Err(BootstrapError::new(format!(
                "maximum flight time must exceed the step (got {})",
                self.max_time
            )));
        }
        let _ = self.log.set(log);
        Ok(())
    }

    fn simulate(
        &self,
        design: &PointMassRocket,
        conditions: &LaunchConditions,
    ) -> Result<FlightTelemetry, EngineError> {
        self.fly(design, conditions, None)
    }

    fn simulate_until(
        &self,
        design: &PointMassRocket,
        conditions: &LaunchConditions,
        deadline: Instant,
    ) -> Result<FlightTelemetry, EngineError> {
        self.fly(design, conditions, Some(deadline))
    }
}

impl PointMassEngine {
    fn fly(
        &self,
        design: &PointMassRocket,
        conditions: &LaunchConditions,
        deadline: Option<Instant>,
    ) -> Result<FlightTelemetry, EngineError> {
        design.validate()?;

        let surface_density = conditions.pressure / (R_DRY_AIR * conditions.temperature);
        if !surface_density.is_finite() || surface_density < 0.0 {
            return Err(EngineError::Simulation(format!(
                "non-physical atmosphere (pressure {}, temperature {})",
                conditions.pressure, conditions.temperature
            )));
        }

        let (sin_a, cos_a) = conditions.launch_angle_rad.sin_cos();
        let (sin_d, cos_d) = conditions.launch_direction_deg.to_radians().sin_cos();
        let (wind_e, wind_n) = conditions.wind_velocity_en();
        let model = FlightModel {
            rocket: design,
            rod_dir: [sin_a * sin_d, sin_a * cos_d, cos_a],
            wind: [wind_e, wind_n, 0.0],
            surface_density,
        };

        let mut state = State {
            pos: [0.0; 3],
            vel: [0.0; 3],
            off_rod: false,
        };
        let mut time = 0.0;
        let mut launched = false;
        let mut samples = vec![sample(time, &state)];

        let mut step: u64 = 0;
        while time < self.max_time {
            if step % DEADLINE_CHECK_STEPS == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(EngineError::Aborted(format!(
                    "deadline passed at t={time:.3}s"
                )));
            }
            step += 1;
            state = rk4_step(&model, &state, time, self.dt);
            time += self.dt;
            if !state.off_rod && norm(&state.pos) >= design.rod_length_m {
                state.off_rod = true;
            }

            if state.pos.iter().chain(state.vel.iter()).any(|v| !v.is_finite()) {
                return Err(EngineError::Simulation(format!(
                    "state diverged at t={time:.3}s"
                )));
            }

            if state.pos[2] > 0.1 {
                launched = true;
            }
            if launched && state.pos[2] <= 0.0 {
                state.pos[2] = 0.0;
                samples.push(sample(time, &state));
                let landing = offset_coordinate(
                    conditions.launch_site,
                    Displacement::new(state.pos[0], state.pos[1]),
                );
                if self.forwarding() {
                    eprintln!(
                        "[engine] landed after {:.2}s at {:.6},{:.6} (angle {:.1} deg)",
                        time,
                        landing.latitude_deg,
                        landing.longitude_deg,
                        conditions.launch_angle_deg()
                    );
                }
                return Ok(FlightTelemetry {
                    samples,
                    landing: Some(landing),
                });
            }
            samples.push(sample(time, &state));
        }

        if launched {
            Err(EngineError::Simulation(format!(
                "flight did not land within {}s",
                self.max_time
            )))
        } else {
            Err(EngineError::Simulation(
                "rocket did not leave the launch rod".into(),
            ))
        }
    }
}

fn sample(time_s: f64, state: &State) -> TelemetrySample {
    TelemetrySample {
        time_s,
        altitude_m: state.pos[2],
        east_m: state.pos[0],
        north_m: state.pos[1],
    }
}

impl FlightModel<'_> {
    fn derivative(&self, state: &State, time: f64) -> Deriv {
        let mass = self.rocket.mass_at(time);
        let thrust = self.rocket.thrust_at(time);

        let air_vel = sub(&state.vel, &self.wind);
        let airspeed = norm(&air_vel);
        let density = self.surface_density * (-state.pos[2].max(0.0) / SCALE_HEIGHT_M).exp();
        let drag_mag = 0.5
            * density
            * airspeed
            * airspeed
            * self.rocket.drag_coefficient
            * self.rocket.reference_area_m2;

        let on_rod = !state.off_rod && norm(&state.pos) < self.rocket.rod_length_m;
        let heading = if on_rod || airspeed < 1e-6 {
            self.rod_dir
        } else {
            scale(&air_vel, 1.0 / airspeed)
        };

        let mut force = scale(&heading, thrust);
        if airspeed > 1e-9 {
            force = add(&force, &scale(&air_vel, -drag_mag / airspeed));
        }
        let mut accel = scale(&force, 1.0 / mass);
        accel[2] -= G0;

        if on_rod {
            // Constrained to the rod; only the pad at its foot carries weight.
            let mut along = dot(&accel, &self.rod_dir);
            let mut speed_along = dot(&state.vel, &self.rod_dir);
            if dot(&state.pos, &self.rod_dir) <= 0.0 {
                along = along.max(0.0);
                speed_along = speed_along.max(0.0);
            }
            return Deriv {
                dpos: scale(&self.rod_dir, speed_along),
                dvel: scale(&self.rod_dir, along),
            };
        }

        Deriv {
            dpos: state.vel,
            dvel: accel,
        }
    }
}

fn rk4_step(model: &FlightModel<'_>, state: &State, time: f64, dt: f64) -> State {
    let advance = |s: &State, d: &Deriv, h: f64| State {
        pos: add(&s.pos, &scale(&d.dpos, h)),
        vel: add(&s.vel, &scale(&d.dvel, h)),
        off_rod: s.off_rod,
    };

    let k1 = model.derivative(state, time);
    let k2 = model.derivative(&advance(state, &k1, dt / 2.0), time + dt / 2.0);
    let k3 = model.derivative(&advance(state, &k2, dt / 2.0), time + dt / 2.0);
    let k4 = model.derivative(&advance(state, &k3, dt), time + dt);

    let combine = |a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3| {
        let mut out = [0.0; 3];
        for i in 0..3 {
            out[i] = (a[i] + 2.0 * b[i] + 2.0 * c[i] + d[i]) / 6.0;
        }
        out
    };

    advance(
        state,
        &Deriv {
            dpos: combine(&k1.dpos, &k2.dpos, &k3.dpos, &k4.dpos),
            dvel: combine(&k1.dvel, &k2.dvel, &k3.dvel, &k4.dvel),
        },
        dt,
    )
}
