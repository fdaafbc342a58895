use serde_json::json;
use sweep_orchestrator::conditions::LaunchConditions;
use sweep_orchestrator::config::weather::{self, MissingFieldError, PressureUnit, WeatherPayload};

fn full_payload() -> WeatherPayload {
    WeatherPayload::from_value(json!({
        "coord": { "lon": -106.97, "lat": 32.99 },
        "main": { "temp": 301.15, "pressure": 1012, "humidity": 18 },
        "wind": { "speed": 4.6, "deg": 250 },
        "name": "Spaceport"
    }))
}

#[test]
fn payload_overrides_the_six_fields_only() {
    let base = LaunchConditions {
        launch_direction_deg: 90.0,
        ..LaunchConditions::default()
    }
    .with_launch_angle_deg(5.0);

    let applied = weather::apply(&full_payload(), base).expect("complete payload");

    assert_eq!(applied.pressure, 1012.0);
    assert_eq!(applied.temperature, 301.15);
    assert_eq!(applied.wind_speed_m_s, 4.6);
    assert_eq!(applied.wind_direction_deg, 250.0);
    assert_eq!(applied.launch_site.latitude_deg, 32.99);
    assert_eq!(applied.launch_site.longitude_deg, -106.97);
    assert_eq!(applied.launch_direction_deg, 90.0);
    assert_eq!(applied.launch_angle_rad, base.launch_angle_rad);
}

#[test]
fn hectopascal_pressure_is_scaled_to_pascal() {
    let applied = weather::apply_with_unit(
        &full_payload(),
        LaunchConditions::default(),
        PressureUnit::Hectopascal,
    )
    .expect("complete payload");
    assert_eq!(applied.pressure, 101_200.0);
}

#[test]
fn missing_wind_speed_is_named() {
    let payload = WeatherPayload::from_value(json!({
        "coord": { "lon": 0.0, "lat": 0.0 },
        "main": { "temp": 290.0, "pressure": 101325 },
        "wind": { "deg": 10 }
    }));
    let err = weather::apply(&payload, LaunchConditions::default()).unwrap_err();
    assert_eq!(err, MissingFieldError { key: "wind.speed" });
    assert!(err.to_string().contains("wind.speed"));
}

#[test]
fn payload_without_wind_object_names_wind_speed() {
    let payload = WeatherPayload::from_value(json!({
        "main": { "temp": 290.0, "pressure": 101325 },
        "coord": { "lon": 0.0, "lat": 0.0 }
    }));
    let err = weather::apply(&payload, LaunchConditions::default()).unwrap_err();
    assert_eq!(err.key, weather::WIND_SPEED_KEY);
}

#[test]
fn missing_parent_object_or_non_numeric_value_is_reported() {
    let no_main = WeatherPayload::from_value(json!({
        "coord": { "lon": 0.0, "lat": 0.0 },
        "wind": { "speed": 1.0, "deg": 10 }
    }));
    assert_eq!(
        no_main.reading().unwrap_err().key,
        weather::PRESSURE_KEY
    );

    let textual = WeatherPayload::from_value(json!({
        "coord": { "lon": 0.0, "lat": "north" },
        "main": { "temp": 290.0, "pressure": 101325 },
        "wind": { "speed": 1.0, "deg": 10 }
    }));
    assert_eq!(textual.reading().unwrap_err().key, weather::LATITUDE_KEY);
}

#[test]
fn payload_parses_from_text_and_file() {
    let text = r#"{"coord":{"lon":1.5,"lat":2.5},"main":{"temp":280,"pressure":99000},"wind":{"speed":0,"deg":0}}"#;
    let parsed: WeatherPayload = text.parse().expect("valid json");
    let reading = parsed.reading().expect("all fields");
    assert_eq!(reading.site.longitude_deg, 1.5);
    assert_eq!(reading.temperature, 280.0);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weather.json");
    std::fs::write(&path, text).expect("write payload");
    let from_file = WeatherPayload::from_path(&path).expect("payload file");
    assert_eq!(from_file, parsed);

    assert!("not json".parse::<WeatherPayload>().is_err());
}
