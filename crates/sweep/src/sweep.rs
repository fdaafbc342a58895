//! Launch-angle sweep over a single simulation definition.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use sweep_config::weather::{self, MissingFieldError, PressureUnit, WeatherPayload};
use sweep_core::geodesy::{
    Displacement, displacement_meters, great_circle_distance_meters, offset_coordinate,
};
use sweep_core::{LaunchConditions, WorldCoordinate};
use sweep_engine::{BootstrapError, EngineError, EngineRuntime, FlightEngine, FlightTelemetry};
use thiserror::Error;

use crate::document::SimulationDefinition;

/// Relative slack when counting steps, so `0..=1` by `0.1` yields 11 angles.
const STEP_TOLERANCE: f64 = 1e-9;
const MAX_STEPS: f64 = 1.0e7;

/// Inclusive launch-angle range in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    start_deg: f64,
    end_deg: f64,
    step_deg: f64,
}

impl SweepRange {
    pub fn new(start_deg: f64, end_deg: f64, step_deg: f64) -> Result<Self, SweepError> {
        if !(start_deg.is_finite() && end_deg.is_finite() && step_deg.is_finite()) {
            return Err(SweepError::InvalidRange(
                "sweep bounds must be finite".into(),
            ));
        }
        if step_deg <= 0.0 {
            return Err(SweepError::InvalidRange(format!(
                "step must be positive (got {step_deg})"
            )));
        }
        if start_deg > end_deg {
            return Err(SweepError::InvalidRange(format!(
                "start {start_deg} exceeds end {end_deg}"
            )));
        }
        if (end_deg - start_deg) / step_deg > MAX_STEPS {
            return Err(SweepError::InvalidRange(format!(
                "range {start_deg}..={end_deg} by {step_deg} has too many steps"
            )));
        }
        Ok(Self {
            start_deg,
            end_deg,
            step_deg,
        })
    }

    /// `floor((end - start) / step) + 1`, immune to rounding at the end point.
    pub fn run_count(&self) -> usize {
        let span = (self.end_deg - self.start_deg) / self.step_deg;
        (span + span * STEP_TOLERANCE + STEP_TOLERANCE).floor() as usize + 1
    }

    /// Angle of step `index`; never accumulated.
    pub fn angle_deg(&self, index: usize) -> f64 {
        self.start_deg + index as f64 * self.step_deg
    }

    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.run_count()).map(|i| self.angle_deg(i))
    }
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start_deg: 0.0,
            end_deg: 45.0,
            step_deg: 1.0,
        }
    }
}

/// Everything a sweep needs besides the engine and the definition.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub range: SweepRange,
    /// Sweep-wide weather; a definition's own payload takes precedence.
    pub weather: Option<WeatherPayload>,
    pub pressure_unit: PressureUnit,
    /// Per-angle limit. The engine receives the matching deadline through
    /// [`FlightEngine::simulate_until`]; an engine that ignores it keeps its
    /// run thread busy until it returns on its own.
    pub run_timeout: Option<Duration>,
    /// Definitions simulated concurrently by [`aggregate`](crate::aggregate::aggregate).
    pub workers: usize,
}

impl SweepPlan {
    pub fn new(range: SweepRange) -> Self {
        Self {
            range,
            weather: None,
            pressure_unit: PressureUnit::default(),
            run_timeout: None,
            workers: 1,
        }
    }

    pub fn with_weather(mut self, weather: WeatherPayload) -> Self {
        self.weather = Some(weather);
        self
    }
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self::new(SweepRange::default())
    }
}

/// Errors that stop a sweep before or instead of running it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("invalid sweep range: {0}")]
    InvalidRange(String),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("weather payload rejected: {0}")]
    Weather(#[from] MissingFieldError),
    #[error("sweep worker panicked")]
    WorkerPanicked,
}

/// Why a single launch angle produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunFailureReason {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("run exceeded the {0:?} timeout")]
    TimedOut(Duration),
}

/// A launch angle whose run failed; the sweep carried on past it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    pub launch_angle_deg: f64,
    pub reason: RunFailureReason,
}

/// Summary of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightResult {
    pub launch_angle_deg: f64,
    pub conditions: LaunchConditions,
    pub max_altitude_m: f64,
    pub flight_time_s: f64,
    pub landing: WorldCoordinate,
    /// Canonical flat-earth displacement from the launch site to `landing`.
    pub landing_displacement: Displacement,
    pub telemetry: FlightTelemetry,
}

impl FlightResult {
    /// Derive the summary from raw telemetry.
    ///
    /// The landing point is the engine's own if it reports one, otherwise the
    /// launch site offset by the final sample's horizontal position.
    pub fn from_telemetry(
        launch_angle_deg: f64,
        conditions: LaunchConditions,
        telemetry: FlightTelemetry,
    ) -> Result<Self, EngineError> {
        let (Some(last), Some(max_altitude_m)) =
            (telemetry.last().copied(), telemetry.max_altitude_m())
        else {
            return Err(EngineError::EmptyTelemetry);
        };
        let site = conditions.launch_site;
        let landing = telemetry.landing.unwrap_or_else(|| {
            offset_coordinate(site, Displacement::new(last.east_m, last.north_m))
        });
        Ok(Self {
            launch_angle_deg,
            conditions,
            max_altitude_m,
            flight_time_s: last.time_s,
            landing,
            landing_displacement: displacement_meters(site, landing),
            telemetry,
        })
    }

    /// Haversine distance from the launch site to the landing point.
    ///
    /// Alternative to `landing_displacement`; not used in reports.
    pub fn great_circle_landing_distance_m(&self) -> f64 {
        let site = self.conditions.launch_site;
        great_circle_distance_meters(
            site.latitude_deg,
            site.longitude_deg,
            self.landing.latitude_deg,
            self.landing.longitude_deg,
        )
    }
}

/// Results of one sweep, in angle order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    pub results: Vec<FlightResult>,
    pub failures: Vec<RunFailure>,
}

impl SweepOutcome {
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

/// Run `definition` once per angle in `plan.range`.
///
/// Bootstraps the engine if needed. Weather is applied once before the first
/// run; a malformed payload aborts this sweep only. A failed or timed-out run
/// is recorded in [`SweepOutcome::failures`] and the next angle proceeds.
pub fn run_sweep<E: FlightEngine>(
    runtime: &EngineRuntime<E>,
    definition: &SimulationDefinition<E::Design>,
    plan: &SweepPlan,
) -> Result<SweepOutcome, SweepError> {
    runtime.initialize()?;

    let base = match definition.weather.as_ref().or(plan.weather.as_ref()) {
        Some(payload) => {
            weather::apply_with_unit(payload, definition.conditions, plan.pressure_unit)?
        }
        None => definition.conditions,
    };

    let mut outcome = SweepOutcome::default();
    for angle_deg in plan.range.angles() {
        let conditions = base.with_launch_angle_deg(angle_deg);
        let run = simulate_once(runtime, &definition.design, conditions, plan.run_timeout)
            .and_then(|telemetry| {
                FlightResult::from_telemetry(angle_deg, conditions, telemetry)
                    .map_err(RunFailureReason::from)
            });
        match run {
            Ok(result) => outcome.results.push(result),
            Err(reason) => outcome.failures.push(RunFailure {
                launch_angle_deg: angle_deg,
                reason,
            }),
        }
    }
    Ok(outcome)
}

fn simulate_once<E: FlightEngine>(
    runtime: &EngineRuntime<E>,
    design: &Arc<E::Design>,
    conditions: LaunchConditions,
    timeout: Option<Duration>,
) -> Result<FlightTelemetry, RunFailureReason> {
    let Some(limit) = timeout else {
        return Ok(contain_panic(|| runtime.simulate(design, &conditions))?);
    };
    if !runtime.is_ready() {
        return Err(EngineError::NotInitialized.into());
    }

    let engine = Arc::clone(runtime.engine());
    let design = Arc::clone(design);
    let deadline = Instant::now().checked_add(limit);
    let (tx, rx) = mpsc::channel();
    // An engine that ignores the deadline keeps this thread; its result is dropped.
    thread::Builder::new()
        .name("flight-run".into())
        .spawn(move || {
            let result = contain_panic(|| match deadline {
                Some(deadline) => engine.simulate_until(&design, &conditions, deadline),
                None => engine.simulate(&design, &conditions),
            });
            let _ = tx.send(result);
        })
        .map_err(|err| EngineError::Aborted(format!("could not spawn run thread: {err}")))?;

    match rx.recv_timeout(limit) {
        Ok(result) => Ok(result?),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(RunFailureReason::TimedOut(limit)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(EngineError::Aborted("run thread exited without a result".into()).into())
        }
    }
}

/// Turn an engine panic into a failure of this one run.
fn contain_panic<F>(run: F) -> Result<FlightTelemetry, EngineError>
where
    F: FnOnce() -> Result<FlightTelemetry, EngineError>,
{
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        Err(EngineError::Aborted(format!(
            "engine panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
