//! Simulation definitions as handed over by a design-document loader.

use std::sync::Arc;

use sweep_config::WeatherPayload;
use sweep_core::LaunchConditions;

/// One named simulation: an engine design plus its base launch conditions.
///
/// The sweep never mutates a definition; every step derives its own
/// [`LaunchConditions`] from `conditions`.
#[derive(Debug)]
pub struct SimulationDefinition<D> {
    pub name: String,
    pub conditions: LaunchConditions,
    pub design: Arc<D>,
    /// Overrides the sweep-wide weather payload for this simulation only.
    pub weather: Option<WeatherPayload>,
}

impl<D> SimulationDefinition<D> {
    pub fn new(name: impl Into<String>, design: D) -> Self {
        Self {
            name: name.into(),
            conditions: LaunchConditions::default(),
            design: Arc::new(design),
            weather: None,
        }
    }

    pub fn with_conditions(mut self, conditions: LaunchConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_weather(mut self, weather: WeatherPayload) -> Self {
        self.weather = Some(weather);
        self
    }
}

impl<D> Clone for SimulationDefinition<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            conditions: self.conditions,
            design: Arc::clone(&self.design),
            weather: self.weather.clone(),
        }
    }
}

/// Ordered collection of simulation definitions from one loaded document.
#[derive(Debug)]
pub struct SimulationDocument<D> {
    simulations: Vec<SimulationDefinition<D>>,
}

impl<D> SimulationDocument<D> {
    pub fn new(simulations: Vec<SimulationDefinition<D>>) -> Self {
        Self { simulations }
    }

    pub fn simulations(&self) -> &[SimulationDefinition<D>] {
        &self.simulations
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }
}

impl<D> Default for SimulationDocument<D> {
    fn default() -> Self {
        Self {
            simulations: Vec::new(),
        }
    }
}

impl<D> FromIterator<SimulationDefinition<D>> for SimulationDocument<D> {
    fn from_iter<I: IntoIterator<Item = SimulationDefinition<D>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
