use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use sweep_orchestrator::conditions::LaunchConditions;
use sweep_orchestrator::config::WeatherPayload;
use sweep_orchestrator::engine::{
    BootstrapError, EngineError, EngineLog, EngineRuntime, FlightEngine, FlightTelemetry,
    TelemetrySample,
};
use sweep_orchestrator::export::{report, table};
use sweep_orchestrator::generate_report;
use sweep_orchestrator::geodesy::WorldCoordinate;
use sweep_orchestrator::sweep::{
    FlightResult, SimulationDefinition, SimulationDocument, SimulationRecord, SweepError,
    SweepPlan, SweepRange, aggregate,
};

/// Replays fixed (altitude, time) pairs indexed by the rounded launch angle.
struct TableEngine {
    flights: Vec<(f64, f64)>,
    bootstraps: AtomicUsize,
}

impl TableEngine {
    fn new(flights: &[(f64, f64)]) -> Self {
        Self {
            flights: flights.to_vec(),
            bootstraps: AtomicUsize::new(0),
        }
    }
}

impl FlightEngine for TableEngine {
    type Design = ();

    fn bootstrap(&self, _log: EngineLog) -> Result<(), BootstrapError> {
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn simulate(
        &self,
        _design: &(),
        conditions: &LaunchConditions,
    ) -> Result<FlightTelemetry, EngineError> {
        let index = conditions.launch_angle_deg().round() as usize;
        let (apex, time) = self
            .flights
            .get(index)
            .copied()
            .ok_or_else(|| EngineError::Simulation(format!("no flight scripted for {index}")))?;
        Ok(FlightTelemetry {
            samples: vec![
                TelemetrySample {
                    time_s: 0.0,
                    altitude_m: 0.0,
                    east_m: 0.0,
                    north_m: 0.0,
                },
                TelemetrySample {
                    time_s: time / 2.0,
                    altitude_m: apex,
                    east_m: 0.0,
                    north_m: 0.0,
                },
                TelemetrySample {
                    time_s: time,
                    altitude_m: 0.0,
                    east_m: 0.0,
                    north_m: 0.0,
                },
            ],
            landing: Some(conditions.launch_site),
        })
    }
}

fn dart_flights() -> [(f64, f64); 3] {
    [(100.0, 10.0), (105.0, 10.2), (102.0, 10.1)]
}

fn plan_0_to_2() -> SweepPlan {
    SweepPlan::new(SweepRange::new(0.0, 2.0, 1.0).expect("range"))
}

fn parse(report: &str) -> Value {
    serde_json::from_str(report).expect("report is valid JSON")
}

#[test]
fn boosted_dart_report_lists_each_launch() {
    let runtime = EngineRuntime::new(TableEngine::new(&dart_flights()), EngineLog::Suppressed);
    let document: SimulationDocument<()> =
        [SimulationDefinition::new("Boosted Dart", ())].into_iter().collect();

    let generated = generate_report(&runtime, &document, &plan_0_to_2()).expect("report");
    let value = parse(&generated.report);

    let dart = &value["Boosted Dart"];
    let keys: Vec<&str> = dart
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["launch1", "launch2", "launch3"]);

    for (i, (apex, time)) in dart_flights().into_iter().enumerate() {
        let launch = &dart[format!("launch{}", i + 1)];
        assert_eq!(launch["launchAngle"], json!(i as f64));
        let stats = &launch["launchStatistics"];
        assert_eq!(stats["maxAltitude"], json!(apex));
        assert_eq!(stats["flightTime"], json!(time));
        assert_eq!(stats["landingDisplacement"]["distance"], json!(0.0));
    }
    assert!(generated.aggregate.aborted.is_empty());
    assert_eq!(generated.aggregate.failure_count(), 0);
}

#[test]
fn empty_document_renders_empty_object() {
    let runtime = EngineRuntime::new(TableEngine::new(&[]), EngineLog::Suppressed);
    let document = SimulationDocument::<()>::default();
    let generated = generate_report(&runtime, &document, &plan_0_to_2()).expect("report");
    assert_eq!(parse(&generated.report), json!({}));
    assert_eq!(runtime.engine().bootstraps.load(Ordering::SeqCst), 1);
}

#[test]
fn all_failed_simulation_is_an_empty_object() {
    let runtime = EngineRuntime::new(TableEngine::new(&[]), EngineLog::Suppressed);
    let document: SimulationDocument<()> =
        [SimulationDefinition::new("Dud", ())].into_iter().collect();
    let generated = generate_report(&runtime, &document, &plan_0_to_2()).expect("report");

    assert_eq!(parse(&generated.report), json!({ "Dud": {} }));
    assert_eq!(generated.aggregate.failure_count(), 3);
}

#[test]
fn malformed_weather_only_skips_its_own_simulation() {
    let runtime = EngineRuntime::new(TableEngine::new(&dart_flights()), EngineLog::Suppressed);
    let broken = WeatherPayload::from_value(json!({
        "coord": { "lat": 1.0, "lon": 1.0 },
        "main": { "temp": 290.0, "pressure": 100000.0 },
        "wind": { "deg": 90.0 }
    }));
    let document: SimulationDocument<()> = [
        SimulationDefinition::new("Alpha", ()),
        SimulationDefinition::new("Broken", ()).with_weather(broken),
        SimulationDefinition::new("Gamma", ()),
    ]
    .into_iter()
    .collect();

    let aggregate = aggregate(&runtime, &document, &plan_0_to_2()).expect("aggregate");
    let names: Vec<&str> = aggregate.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Gamma"]);
    assert_eq!(aggregate.aborted.len(), 1);
    assert_eq!(aggregate.aborted[0].name, "Broken");
    assert!(matches!(
        aggregate.aborted[0].reason,
        SweepError::Weather(ref missing) if missing.key == "wind.speed"
    ));
}

#[test]
fn parallel_workers_keep_document_order() {
    let engine = Arc::new(TableEngine::new(&dart_flights()));
    let runtime = EngineRuntime::from_shared(Arc::clone(&engine), EngineLog::Suppressed);
    let names: Vec<String> = (0..7).map(|i| format!("Sim {i}")).collect();
    let document: SimulationDocument<()> = names
        .iter()
        .map(|name| SimulationDefinition::new(name.clone(), ()))
        .collect();
    let mut plan = plan_0_to_2();
    plan.workers = 3;

    let aggregate = aggregate(&runtime, &document, &plan).expect("aggregate");
    let got: Vec<&String> = aggregate.records.iter().map(|r| &r.name).collect();
    assert_eq!(got, names.iter().collect::<Vec<_>>());
    assert!(aggregate.records.iter().all(|r| r.results.len() == 3));
    assert_eq!(engine.bootstraps.load(Ordering::SeqCst), 1);

    let sequential = {
        plan.workers = 1;
        sweep_orchestrator::sweep::aggregate(&runtime, &document, &plan).expect("aggregate")
    };
    assert_eq!(sequential, aggregate);
}

#[test]
fn bootstrap_failure_fails_the_whole_report() {
    struct Refusing;
    impl FlightEngine for Refusing {
        type Design = ();
        fn bootstrap(&self, _: EngineLog) -> Result<(), BootstrapError> {
            Err(BootstrapError::new("no engine"))
        }
        fn simulate(&self, _: &(), _: &LaunchConditions) -> Result<FlightTelemetry, EngineError> {
            Err(EngineError::NotInitialized)
        }
    }

    let runtime = EngineRuntime::new(Refusing, EngineLog::Suppressed);
    let document: SimulationDocument<()> =
        [SimulationDefinition::new("A", ())].into_iter().collect();
    let err = generate_report(&runtime, &document, &plan_0_to_2()).unwrap_err();
    assert!(matches!(err, SweepError::Bootstrap(_)));
}

fn record(name: &str, results: Vec<FlightResult>) -> SimulationRecord {
    SimulationRecord {
        name: name.to_string(),
        results,
        failures: Vec::new(),
    }
}

fn result_at(angle: f64, apex: f64) -> FlightResult {
    let conditions = LaunchConditions {
        launch_site: WorldCoordinate::new(10.0, 10.0),
        ..LaunchConditions::default()
    }
    .with_launch_angle_deg(angle);
    FlightResult::from_telemetry(
        angle,
        conditions,
        FlightTelemetry {
            samples: vec![
                TelemetrySample {
                    time_s: 0.0,
                    altitude_m: 0.0,
                    east_m: 0.0,
                    north_m: 0.0,
                },
                TelemetrySample {
                    time_s: 3.0,
                    altitude_m: apex,
                    east_m: 30.0,
                    north_m: 40.0,
                },
            ],
            landing: None,
        },
    )
    .expect("non-empty telemetry")
}

#[test]
fn duplicate_names_are_suffixed_in_order() {
    let records = vec![
        record("Dart", vec![result_at(0.0, 10.0)]),
        record("Dart", vec![result_at(0.0, 20.0)]),
        record("Dart (2)", vec![]),
        record("Dart", vec![]),
    ];
    let value = report::to_value(&records);
    let keys: Vec<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["Dart", "Dart (2)", "Dart (2) (2)", "Dart (3)"]);
    assert_eq!(
        value["Dart (2)"]["launch1"]["launchStatistics"]["maxAltitude"],
        json!(20.0)
    );
}

#[test]
fn non_finite_values_become_null() {
    let mut odd = result_at(5.0, 10.0);
    odd.max_altitude_m = f64::NAN;
    let records = vec![record("Odd", vec![odd])];
    let value = report::to_value(&records);
    let stats = &value["Odd"]["launch1"]["launchStatistics"];
    assert_eq!(stats["maxAltitude"], Value::Null);
    assert_eq!(stats["flightTime"], json!(3.0));
    let displacement = &stats["landingDisplacement"];
    assert!((displacement["east"].as_f64().unwrap() - 30.0).abs() < 1e-6);
    assert!((displacement["north"].as_f64().unwrap() - 40.0).abs() < 1e-6);
    assert!((displacement["distance"].as_f64().unwrap() - 50.0).abs() < 1e-6);

    // The pretty printer still produces parseable JSON.
    assert!(serde_json::from_str::<Value>(&report::serialize(&records)).is_ok());
}

#[test]
fn launch_table_has_one_row_per_result() {
    let records = vec![
        record("Dart", vec![result_at(0.0, 10.0), result_at(1.0, 11.0)]),
        record("Empty", vec![]),
        record("Arrow", vec![result_at(2.0, 12.0)]),
    ];
    let mut buffer = Vec::new();
    table::write_launches(&mut buffer, &records).expect("csv");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(&headers[0], "simulation");
    assert_eq!(&headers[1], "launch_index");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "Dart");
    assert_eq!(&rows[1][1], "2");
    assert_eq!(&rows[2][0], "Arrow");
    assert_eq!(&rows[2][2], "2.0");
}

/// Design `true` makes the engine panic mid-run.
struct PanickyEngine;

impl FlightEngine for PanickyEngine {
    type Design = bool;

    fn bootstrap(&self, _: EngineLog) -> Result<(), BootstrapError> {
        Ok(())
    }

    fn simulate(
        &self,
        explode: &bool,
        conditions: &LaunchConditions,
    ) -> Result<FlightTelemetry, EngineError> {
        if *explode {
            panic!("integrator blew up");
        }
        TableEngine::new(&dart_flights()).simulate(&(), conditions)
    }
}

fn panicky_document() -> SimulationDocument<bool> {
    [("A", false), ("B", false), ("C", true), ("D", false)]
        .into_iter()
        .map(|(name, explode)| SimulationDefinition::new(name, explode))
        .collect()
}

fn assert_panic_stays_with_its_run(aggregate: &sweep_orchestrator::sweep::Aggregate) {
    assert!(aggregate.aborted.is_empty(), "{:?}", aggregate.aborted);
    let shape: Vec<(&str, usize, usize)> = aggregate
        .records
        .iter()
        .map(|r| (r.name.as_str(), r.results.len(), r.failures.len()))
        .collect();
    assert_eq!(shape, [("A", 3, 0), ("B", 3, 0), ("C", 0, 3), ("D", 3, 0)]);
    let failure = &aggregate.records[2].failures[0];
    assert!(failure.reason.to_string().contains("integrator blew up"));
}

#[test]
fn engine_panic_is_a_run_failure_with_parallel_workers() {
    let runtime = EngineRuntime::new(PanickyEngine, EngineLog::Suppressed);
    let mut plan = plan_0_to_2();
    plan.workers = 2;
    let aggregate = aggregate(&runtime, &panicky_document(), &plan).expect("aggregate");
    assert_panic_stays_with_its_run(&aggregate);
}

#[test]
fn engine_panic_is_a_run_failure_sequentially_and_with_timeout() {
    let runtime = EngineRuntime::new(PanickyEngine, EngineLog::Suppressed);
    let document = panicky_document();

    let sequential = aggregate(&runtime, &document, &plan_0_to_2()).expect("aggregate");
    assert_panic_stays_with_its_run(&sequential);

    let mut timed = plan_0_to_2();
    timed.run_timeout = Some(std::time::Duration::from_secs(30));
    let timed = aggregate(&runtime, &document, &timed).expect("aggregate");
    assert_panic_stays_with_its_run(&timed);
}
