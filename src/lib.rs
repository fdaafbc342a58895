//! Launch-angle sweep orchestrator.
//!
//! Drives an external flight engine over a range of launch angles for every
//! simulation in a loaded document, derives landing metrics from each run,
//! and renders the aggregate as a JSON report. The workspace crates are
//! re-exported here so front-ends only depend on this one.

pub use sweep_config as config;
pub use sweep_core::{conditions, constants, geodesy, runtime, units};
pub use sweep_engine as engine;
pub use sweep_export as export;
pub use sweep_runner as sweep;

use sweep_engine::{EngineRuntime, FlightEngine};
use sweep_runner::{Aggregate, SimulationDocument, SweepError, SweepPlan};

/// Report text together with the aggregate it was rendered from.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: String,
    pub aggregate: Aggregate,
}

/// Sweep every simulation in `document` and serialize the records.
///
/// Fails only when the engine cannot be bootstrapped; per-angle and
/// per-simulation failures are carried in `aggregate`.
pub fn generate_report<E: FlightEngine>(
    runtime: &EngineRuntime<E>,
    document: &SimulationDocument<E::Design>,
    plan: &SweepPlan,
) -> Result<GeneratedReport, SweepError> {
    let aggregate = sweep_runner::aggregate(runtime, document, plan)?;
    let report = sweep_export::serialize(&aggregate.records);
    Ok(GeneratedReport { report, aggregate })
}
