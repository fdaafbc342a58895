use std::sync::{Arc, Mutex, OnceLock};

use sweep_core::LaunchConditions;

use crate::{BootstrapError, EngineError, EngineLog, FlightEngine, FlightTelemetry};

/// Owns an engine together with its bootstrap state.
///
/// `initialize` is idempotent and safe to call from several threads: the
/// first successful call runs [`FlightEngine::bootstrap`], later calls return
/// immediately. A failed bootstrap leaves the runtime not ready, so the next
/// call retries.
pub struct EngineRuntime<E: FlightEngine> {
    engine: Arc<E>,
    log: EngineLog,
    ready: OnceLock<()>,
    init_lock: Mutex<()>,
}

impl<E: FlightEngine> EngineRuntime<E> {
    pub fn new(engine: E, log: EngineLog) -> Self {
        Self::from_shared(Arc::new(engine), log)
    }

    pub fn from_shared(engine: Arc<E>, log: EngineLog) -> Self {
        Self {
            engine,
            log,
            ready: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn initialize(&self) -> Result<(), BootstrapError> {
        if self.ready.get().is_some() {
            return Ok(());
        }
        let _lock = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.ready.get().is_some() {
            return Ok(());
        }
        self.engine.bootstrap(self.log)?;
        let _ = self.ready.set(());
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get().is_some()
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Run one flight. Fails with [`EngineError::NotInitialized`] before a
    /// successful [`initialize`](Self::initialize).
    pub fn simulate(
        &self,
        design: &E::Design,
        conditions: &LaunchConditions,
    ) -> Result<FlightTelemetry, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotInitialized);
        }
        self.engine.simulate(design, conditions)
    }
}
