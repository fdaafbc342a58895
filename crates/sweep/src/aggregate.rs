//! One record per simulation definition, in document order.

use std::thread;

use sweep_engine::{EngineRuntime, FlightEngine};

use crate::document::{SimulationDefinition, SimulationDocument};
use crate::sweep::{FlightResult, RunFailure, SweepError, SweepOutcome, SweepPlan, run_sweep};

/// The completed sweep of one simulation definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    pub name: String,
    /// Successful runs in angle order. Positions are ordinal; each result
    /// carries its own angle.
    pub results: Vec<FlightResult>,
    pub failures: Vec<RunFailure>,
}

/// A definition whose sweep could not run at all.
#[derive(Debug, Clone, PartialEq)]
pub struct AbortedSimulation {
    pub name: String,
    pub reason: SweepError,
}

/// Best-effort outcome of sweeping a whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub records: Vec<SimulationRecord>,
    pub aborted: Vec<AbortedSimulation>,
}

impl Aggregate {
    pub fn failure_count(&self) -> usize {
        self.records.iter().map(|r| r.failures.len()).sum()
    }
}

/// Sweep every definition in `document`.
///
/// Only an engine bootstrap failure is returned as an error. A definition
/// whose sweep cannot start (for example a malformed weather payload) lands in
/// [`Aggregate::aborted`] and its siblings are unaffected. With
/// `plan.workers > 1` definitions are spread over scoped threads; ordering is
/// preserved either way.
pub fn aggregate<E: FlightEngine>(
    runtime: &EngineRuntime<E>,
    document: &SimulationDocument<E::Design>,
    plan: &SweepPlan,
) -> Result<Aggregate, SweepError> {
    runtime.initialize()?;

    let definitions = document.simulations();
    let outcomes: Vec<Result<SweepOutcome, SweepError>> =
        if plan.workers <= 1 || definitions.len() <= 1 {
            definitions
                .iter()
                .map(|definition| run_sweep(runtime, definition, plan))
                .collect()
        } else {
            run_parallel(runtime, definitions, plan)
        };

    let mut aggregate = Aggregate::default();
    for (definition, outcome) in definitions.iter().zip(outcomes) {
        match outcome {
            Ok(SweepOutcome { results, failures }) => aggregate.records.push(SimulationRecord {
                name: definition.name.clone(),
                results,
                failures,
            }),
            Err(SweepError::Bootstrap(err)) => return Err(SweepError::Bootstrap(err)),
            Err(reason) => aggregate.aborted.push(AbortedSimulation {
                name: definition.name.clone(),
                reason,
            }),
        }
    }
    Ok(aggregate)
}

fn run_parallel<E: FlightEngine>(
    runtime: &EngineRuntime<E>,
    definitions: &[SimulationDefinition<E::Design>],
    plan: &SweepPlan,
) -> Vec<Result<SweepOutcome, SweepError>> {
    let workers = plan.workers.min(definitions.len());
    let mut slots: Vec<Option<Result<SweepOutcome, SweepError>>> =
        definitions.iter().map(|_| None).collect();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || {
                    definitions
                        .iter()
                        .enumerate()
                        .skip(worker)
                        .step_by(workers)
                        .map(|(index, definition)| (index, run_sweep(runtime, definition, plan)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            if let Ok(batch) = handle.join() {
                for (index, outcome) in batch {
                    slots[index] = Some(outcome);
                }
            }
        }
    });

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Err(SweepError::WorkerPanicked)))
        .collect()
}
