//! Re-exported APIs for consumers of the sweep crate.

pub use crate::aggregate::{AbortedSimulation, Aggregate, SimulationRecord, aggregate};
pub use crate::document::{SimulationDefinition, SimulationDocument};
pub use crate::sweep::{
    FlightResult, RunFailure, RunFailureReason, SweepError, SweepOutcome, SweepPlan, SweepRange,
    run_sweep,
};

pub mod catalog {
    use std::path::Path;

    use sweep_config::{
        ConfigError, RocketConfig, SimulationConfig, WeatherError, WeatherPayload,
        load_simulation_configs,
    };
    use sweep_engine::point_mass::{DEFAULT_ROD_LENGTH_M, PointMassRocket};
    use thiserror::Error;

    use crate::document::{SimulationDefinition, SimulationDocument};

    /// Errors surfaced while turning a scenario catalog into a document.
    #[derive(Debug, Error)]
    pub enum CatalogError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("weather payload for simulation '{name}': {source}")]
        Weather {
            name: String,
            #[source]
            source: WeatherError,
        },
    }

    /// Convert a `RocketConfig` into the reference engine's design.
    pub fn rocket_from_config(config: &RocketConfig) -> PointMassRocket {
        PointMassRocket {
            dry_mass_kg: config.dry_mass_kg,
            propellant_mass_kg: config.propellant_mass_kg,
            thrust_newtons: config.thrust_newtons,
            burn_time_s: config.burn_time_s,
            drag_coefficient: config.drag_coefficient,
            reference_area_m2: config.reference_area_m2,
            rod_length_m: config.rod_length_m.unwrap_or(DEFAULT_ROD_LENGTH_M),
        }
    }

    /// Build a definition, reading its weather payload from disk if it names one.
    pub fn definition_from_config(
        config: &SimulationConfig,
    ) -> Result<SimulationDefinition<PointMassRocket>, CatalogError> {
        let mut definition =
            SimulationDefinition::new(config.name.clone(), rocket_from_config(&config.rocket))
                .with_conditions(config.conditions);
        if let Some(path) = &config.weather {
            let payload =
                WeatherPayload::from_path(path).map_err(|source| CatalogError::Weather {
                    name: config.name.clone(),
                    source,
                })?;
            definition = definition.with_weather(payload);
        }
        Ok(definition)
    }

    /// Load a scenario catalog (YAML list, TOML file, or TOML directory).
    pub fn load_document<P: AsRef<Path>>(
        path: P,
    ) -> Result<SimulationDocument<PointMassRocket>, CatalogError> {
        let configs = load_simulation_configs(path)?;
        configs.iter().map(definition_from_config).collect()
    }
}
