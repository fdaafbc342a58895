use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sweep_orchestrator::config::{
    PressureUnit, SweepConfig, WeatherPayload, load_sweep_config, validate_sweep_config,
};
use sweep_orchestrator::engine::point_mass::PointMassEngine;
use sweep_orchestrator::engine::{EngineLog, EngineRuntime};
use sweep_orchestrator::export::{self, table};
use sweep_orchestrator::sweep::{SweepPlan, SweepRange, catalog};

/// Sweep every simulation in a scenario catalog over a range of launch angles.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Launch-angle sweep report generator (reference point-mass engine)"
)]
struct Cli {
    /// Scenario catalog: YAML list, single TOML file, or directory of TOML files
    #[arg(long)]
    catalog: PathBuf,

    /// Sweep configuration file (TOML or YAML); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weather payload (JSON) applied to every simulation without its own
    #[arg(long)]
    weather: Option<PathBuf>,

    /// First launch angle in degrees from vertical
    #[arg(long, allow_negative_numbers = true)]
    start: Option<f64>,

    /// Last launch angle in degrees (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    end: Option<f64>,

    /// Angle increment in degrees
    #[arg(long)]
    step: Option<f64>,

    /// Per-run timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Number of simulations swept concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Unit of the weather payload's `main.pressure`
    #[arg(long, value_enum)]
    pressure_unit: Option<PressureArg>,

    /// What the engine may do with its own diagnostics
    #[arg(long, value_enum)]
    engine_log: Option<EngineLogArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file (use '-' for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Engine integration step in seconds
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// Engine cut-off for a single flight in seconds
    #[arg(long, default_value_t = 600.0)]
    max_flight_time: f64,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Format {
    Json,
    Csv,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum PressureArg {
    Pascal,
    Hectopascal,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum EngineLogArg {
    Suppressed,
    Forwarded,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let range = SweepRange::new(config.start_angle_deg, config.end_angle_deg, config.step_deg)?;
    let mut plan = SweepPlan::new(range);
    plan.pressure_unit = config.pressure_unit;
    plan.run_timeout = config
        .run_timeout_s
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("run_timeout_s is not a representable duration")?;
    plan.workers = config.workers;
    if let Some(path) = &config.weather {
        let payload = WeatherPayload::from_path(path)
            .with_context(|| format!("reading weather payload {}", path.display()))?;
        plan.weather = Some(payload);
    }

    let document = catalog::load_document(&cli.catalog)
        .with_context(|| format!("loading catalog {}", cli.catalog.display()))?;
    if document.is_empty() {
        eprintln!(
            "[warn] catalog {} contains no simulations",
            cli.catalog.display()
        );
    }

    let runtime = EngineRuntime::new(
        PointMassEngine::new(cli.dt, cli.max_flight_time),
        config.engine_log,
    );
    let generated = sweep_orchestrator::generate_report(&runtime, &document, &plan)?;

    for aborted in &generated.aggregate.aborted {
        eprintln!(
            "[warn] simulation '{}' skipped: {}",
            aborted.name, aborted.reason
        );
    }
    for record in &generated.aggregate.records {
        for failure in &record.failures {
            eprintln!(
                "[warn] {}: launch angle {:.2} deg failed: {}",
                record.name, failure.launch_angle_deg, failure.reason
            );
        }
    }

    let mut writer = export::writer_for_path(&cli.output)?;
    match cli.format {
        Format::Json => writeln!(writer, "{}", generated.report)?,
        Format::Csv => table::write_launches(&mut writer, &generated.aggregate.records)?,
    }
    writer.flush()?;

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<SweepConfig> {
    let mut config = match &cli.config {
        Some(path) => load_sweep_config(path)
            .with_context(|| format!("loading sweep config {}", path.display()))?,
        None => SweepConfig::default(),
    };

    if let Some(start) = cli.start {
        config.start_angle_deg = start;
    }
    if let Some(end) = cli.end {
        config.end_angle_deg = end;
    }
    if let Some(step) = cli.step {
        config.step_deg = step;
    }
    if let Some(timeout) = cli.timeout {
        config.run_timeout_s = Some(timeout);
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(weather) = &cli.weather {
        config.weather = Some(weather.clone());
    }
    if let Some(unit) = cli.pressure_unit {
        config.pressure_unit = match unit {
            PressureArg::Pascal => PressureUnit::Pascal,
            PressureArg::Hectopascal => PressureUnit::Hectopascal,
        };
    }
    if let Some(log) = cli.engine_log {
        config.engine_log = match log {
            EngineLogArg::Suppressed => EngineLog::Suppressed,
            EngineLogArg::Forwarded => EngineLog::Forwarded,
        };
    }

    validate_sweep_config(&config)?;
    Ok(config)
}
