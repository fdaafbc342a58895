//! Configuration models and loaders for the sweep orchestrator.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sweep_core::LaunchConditions;
use sweep_core::runtime::EngineLog;
use thiserror::Error;

pub mod weather;

pub use weather::{MissingFieldError, PressureUnit, WeatherError, WeatherPayload};

/// Sweep configuration parsed from a TOML or YAML file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub step_deg: f64,
    pub run_timeout_s: Option<f64>,
    pub workers: usize,
    pub weather: Option<PathBuf>,
    pub pressure_unit: PressureUnit,
    pub engine_log: EngineLog,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_angle_deg: 0.0,
            end_angle_deg: 45.0,
            step_deg: 1.0,
            run_timeout_s: None,
            workers: 1,
            weather: None,
            pressure_unit: PressureUnit::default(),
            engine_log: EngineLog::default(),
        }
    }
}

/// Rocket parameters for the reference point-mass engine.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RocketConfig {
    pub dry_mass_kg: f64,
    pub propellant_mass_kg: f64,
    pub thrust_newtons: f64,
    pub burn_time_s: f64,
    pub drag_coefficient: f64,
    pub reference_area_m2: f64,
    #[serde(default)]
    pub rod_length_m: Option<f64>,
}

/// One named simulation entry in a scenario catalog.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    pub name: String,
    pub rocket: RocketConfig,
    #[serde(default)]
    pub conditions: LaunchConditions,
    /// Per-simulation weather payload overriding the sweep-wide one.
    #[serde(default)]
    pub weather: Option<PathBuf>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid sweep configuration: {0}")]
    Invalid(String),
}

/// Load a sweep configuration from a YAML or TOML file.
///
/// A relative `weather` path is resolved against the configuration file's
/// directory.
pub fn load_sweep_config<P: AsRef<Path>>(path: P) -> Result<SweepConfig, ConfigError> {
    let path = path.as_ref();
    let mut config: SweepConfig = load_record(path)?;
    if let Some(weather) = config.weather.take() {
        config.weather = Some(resolve_relative(path, weather));
    }
    validate_sweep_config(&config)?;
    Ok(config)
}

/// Check the sweep bounds without loading anything.
pub fn validate_sweep_config(config: &SweepConfig) -> Result<(), ConfigError> {
    let bounds = [config.start_angle_deg, config.end_angle_deg, config.step_deg];
    if bounds.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::Invalid("sweep bounds must be finite".into()));
    }
    if config.step_deg <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "step_deg must be positive (got {})",
            config.step_deg
        )));
    }
    if config.start_angle_deg > config.end_angle_deg {
        return Err(ConfigError::Invalid(format!(
            "start_angle_deg {} exceeds end_angle_deg {}",
            config.start_angle_deg, config.end_angle_deg
        )));
    }
    if let Some(timeout) = config.run_timeout_s {
        let representable = Duration::try_from_secs_f64(timeout).is_ok();
        if !(timeout.is_finite() && timeout > 0.0 && representable) {
            return Err(ConfigError::Invalid(format!(
                "run_timeout_s must be a positive, representable number of seconds (got {timeout})"
            )));
        }
    }
    if config.workers == 0 {
        return Err(ConfigError::Invalid("workers must be at least 1".into()));
    }
    Ok(())
}

/// Load simulation entries from a YAML list, a single TOML file, or a
/// directory of TOML files (sorted by file name).
///
/// Relative per-simulation weather paths are resolved against the file they
/// were declared in.
pub fn load_simulation_configs<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<SimulationConfig>, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        let mut records = Vec::new();
        for file in toml_files(path)? {
            let mut record: SimulationConfig = load_record(&file)?;
            record.weather = record.weather.map(|w| resolve_relative(&file, w));
            records.push(record);
        }
        Ok(records)
    } else {
        let mut records: Vec<SimulationConfig> = load_records(path)?;
        for record in &mut records {
            record.weather = record.weather.take().map(|w| resolve_relative(path, w));
        }
        Ok(records)
    }
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let record: T = load_record(path)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn toml_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    Ok(entries)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn resolve_relative(config_path: &Path, target: PathBuf) -> PathBuf {
    if target.is_absolute() {
        return target;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(target),
        _ => target,
    }
}
