use sweep_orchestrator::geodesy::{
    Displacement, WorldCoordinate, displacement_meters, great_circle_distance_meters,
    offset_coordinate,
};

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

#[test]
fn identical_points_have_zero_displacement() {
    let site = WorldCoordinate::new(32.99, -106.97);
    let d = displacement_meters(site, site);
    assert_eq!(d.east_m, 0.0);
    assert_eq!(d.north_m, 0.0);
    assert_eq!(d.distance_m(), 0.0);
}

#[test]
fn one_degree_north_uses_standard_figure() {
    let from = WorldCoordinate::new(10.0, 20.0);
    let to = WorldCoordinate::new(11.0, 20.0);
    let d = displacement_meters(from, to);
    assert_close(d.north_m, 111_325.0, 1e-6);
    assert_close(d.east_m, 0.0, 1e-9);
}

#[test]
fn longitude_scale_shrinks_with_cosine_of_origin_latitude() {
    let equator = displacement_meters(
        WorldCoordinate::new(0.0, 0.0),
        WorldCoordinate::new(0.0, 1.0),
    );
    assert_close(equator.east_m, 111_050.0, 1e-6);

    let sixty = displacement_meters(
        WorldCoordinate::new(60.0, 0.0),
        WorldCoordinate::new(60.0, 1.0),
    );
    assert_close(sixty.east_m, 111_050.0 * 0.5, 1e-6);
}

#[test]
fn reversing_endpoints_negates_within_relative_tolerance() {
    let a = WorldCoordinate::new(47.6, -122.3);
    let b = WorldCoordinate::new(47.61, -122.28);
    let forward = displacement_meters(a, b);
    let backward = displacement_meters(b, a);

    assert_close(backward.north_m, -forward.north_m, 1e-6);
    // East scale depends on the origin latitude, so only approximately antisymmetric.
    let rel = (backward.east_m + forward.east_m).abs() / forward.east_m.abs();
    assert!(rel < 1e-3, "east components differ by {rel}");
    assert_close(forward.reversed().east_m, -forward.east_m, 0.0);
}

#[test]
fn offset_coordinate_inverts_displacement() {
    let origin = WorldCoordinate::new(-33.9, 151.2);
    let displacement = Displacement::new(1_250.0, -730.0);
    let landing = offset_coordinate(origin, displacement);
    let recovered = displacement_meters(origin, landing);
    assert_close(recovered.east_m, displacement.east_m, 1e-6);
    assert_close(recovered.north_m, displacement.north_m, 1e-6);
}

#[test]
fn offset_at_pole_keeps_longitude() {
    let pole = WorldCoordinate::new(90.0, 12.0);
    let moved = offset_coordinate(pole, Displacement::new(500.0, -100.0));
    assert_eq!(moved.longitude_deg, 12.0);
    assert_close(moved.latitude_deg, 90.0 - 100.0 / 111_325.0, 1e-12);
}

#[test]
fn haversine_matches_known_distances() {
    assert_eq!(great_circle_distance_meters(1.0, 2.0, 1.0, 2.0), 0.0);

    // A quarter of the meridian.
    let quarter = great_circle_distance_meters(0.0, 0.0, 90.0, 0.0);
    assert_close(quarter, std::f64::consts::FRAC_PI_2 * 6_371_000.0, 1e-3);

    // For short hops the flat-earth figure and the haversine agree closely.
    let a = WorldCoordinate::new(35.0, -117.0);
    let b = WorldCoordinate::new(35.01, -116.99);
    let flat = displacement_meters(a, b).distance_m();
    let round = great_circle_distance_meters(35.0, -117.0, 35.01, -116.99);
    assert!((flat - round).abs() / round < 0.01, "flat {flat} vs round {round}");
}
