//! Boundary to the external flight-simulation engine.
//!
//! The orchestrator treats the engine as a black box: it hands over a design
//! and a [`LaunchConditions`] value and receives [`FlightTelemetry`] or an
//! [`EngineError`]. Engines that need one-time process setup (databases,
//! presets) do it in [`FlightEngine::bootstrap`], which callers reach only
//! through [`EngineRuntime::initialize`].

use std::time::Instant;

use sweep_core::{LaunchConditions, WorldCoordinate};
use thiserror::Error;

pub mod point_mass;
mod runtime;

pub use runtime::EngineRuntime;
pub use sweep_core::runtime::EngineLog;

/// A flight-simulation engine.
pub trait FlightEngine: Send + Sync + 'static {
    /// Engine-specific rocket design shared read-only across runs.
    type Design: Send + Sync + 'static;

    /// One-time setup. Called at most once per [`EngineRuntime`].
    fn bootstrap(&self, log: EngineLog) -> Result<(), BootstrapError>;

    /// Simulate a single flight. Must not retain `conditions`.
    fn simulate(
        &self,
        design: &Self::Design,
        conditions: &LaunchConditions,
    ) -> Result<FlightTelemetry, EngineError>;

    /// Simulate a single flight that may give up once `deadline` has passed.
    ///
    /// Used when the caller enforces a per-run timeout. The default ignores
    /// the deadline.
    fn simulate_until(
        &self,
        design: &Self::Design,
        conditions: &LaunchConditions,
        deadline: Instant,
    ) -> Result<FlightTelemetry, EngineError> {
        let _ = deadline;
        self.simulate(design, conditions)
    }
}

/// A single telemetry sample in the launch-site East-North-Up frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub time_s: f64,
    pub altitude_m: f64,
    pub east_m: f64,
    pub north_m: f64,
}

/// Output of one engine run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightTelemetry {
    pub samples: Vec<TelemetrySample>,
    /// Landing point if the engine tracks geodetic position itself.
    pub landing: Option<WorldCoordinate>,
}

impl FlightTelemetry {
    pub fn last(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }

    /// Highest altitude reached, `None` without samples.
    pub fn max_altitude_m(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.altitude_m)
            .reduce(f64::max)
    }

    /// Time of the final sample, `None` without samples.
    pub fn flight_time_s(&self) -> Option<f64> {
        self.last().map(|s| s.time_s)
    }
}

/// Failure of a single simulated flight.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("engine used before bootstrap completed")]
    NotInitialized,
    #[error("simulation failed: {0}")]
    Simulation(String),
    #[error("simulation produced no telemetry")]
    EmptyTelemetry,
    #[error("simulation aborted: {0}")]
    Aborted(String),
}

/// The engine's one-time setup failed; nothing can be simulated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("engine bootstrap failed: {message}")]
pub struct BootstrapError {
    pub message: String,
}

impl BootstrapError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
