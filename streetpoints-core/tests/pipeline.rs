mod common;

use common::{FakeGeocoder, FakeNetwork, config, segment};
use hashbrown::HashSet;
use streetpoints_core::prelude::*;

fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

fn run(network: &FakeNetwork, config: &PipelineConfig) -> PipelineOutput {
    extract_street_points(config, &FakeGeocoder::new(), network).expect("pipeline should succeed")
}

#[test]
fn straight_street_yields_evenly_spaced_points_with_constant_heading() {
    let network = FakeNetwork::new(vec![segment(
        "100",
        Some("Straight Street"),
        RoadClass::Residential,
        &[(50.0, 100.0), (150.0, 100.0)],
    )]);

    for strategy in [
        HeadingStrategy::Compass,
        HeadingStrategy::Planar { rotation_deg: 0.0 },
    ] {
        let output = run(&network, &config(10.0, strategy));
        let points = output.table.points();
        assert_eq!(points.len(), 10);
        assert!(output.warnings.is_empty());

        for (k, point) in points.iter().enumerate() {
            assert_eq!(point.index, k);
            let expected_x = common::ORIGIN_X + 50.0 + 10.0 * k as f64;
            assert!((point.x_m - expected_x).abs() < 1e-6, "x at {k}: {}", point.x_m);
            assert!((point.y_m - (common::ORIGIN_Y + 100.0)).abs() < 1e-6);
        }

        let first = points[0].heading_deg;
        if let HeadingStrategy::Planar { .. } = strategy {
            // due grid east
            assert!(points.iter().all(|p| angle_diff(p.heading_deg, first) < 1e-6));
            assert!(angle_diff(first, 0.0) < 1e-6);
        } else {
            // grid east points slightly south of true east here (meridian convergence)
            assert!(points.iter().all(|p| angle_diff(p.heading_deg, first) < 1e-2));
            assert!(first > 90.0 && first < 92.0, "compass heading {first}");
        }
    }
}

#[test]
fn zero_length_street_yields_single_point_with_zero_heading() {
    let network = FakeNetwork::new(vec![segment(
        "7",
        None,
        RoadClass::Tertiary,
        &[(200.0, 200.0), (200.0, 200.0)],
    )]);

    let output = run(&network, &config(1.0, HeadingStrategy::Compass));
    let points = output.table.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].index, 0);
    assert_eq!(points[0].heading_deg, 0.0);
    assert_eq!(points[0].name, None);
}

#[test]
fn touching_segments_merge_into_one_line() {
    let network = FakeNetwork::new(vec![
        segment("55", Some("Elbow"), RoadClass::Secondary, &[(50.0, 50.0), (80.0, 50.0)]),
        segment("55", Some("Elbow"), RoadClass::Secondary, &[(80.0, 50.0), (80.0, 90.0)]),
    ]);

    let output = run(&network, &config(10.0, HeadingStrategy::Planar { rotation_deg: 0.0 }));
    assert!(output.warnings.is_empty());

    let points: Vec<&SampledPoint> = output.table.street("55").collect();
    // 70 m of line
    assert_eq!(points.len(), 7);
    assert!((points[4].x_m - (common::ORIGIN_X + 80.0)).abs() < 1e-6);
    assert!((points[4].y_m - (common::ORIGIN_Y + 60.0)).abs() < 1e-6);
    assert!(angle_diff(points[1].heading_deg, 0.0) < 1e-6);
    assert!(angle_diff(points[6].heading_deg, 90.0) < 1e-6);
}

#[test]
fn disjoint_segments_warn_and_number_contiguously() {
    let network = FakeNetwork::new(vec![
        segment("77", None, RoadClass::Primary, &[(10.0, 10.0), (30.0, 10.0)]),
        segment("77", None, RoadClass::Primary, &[(200.0, 300.0), (200.0, 315.0)]),
    ]);

    let output = run(&network, &config(10.0, HeadingStrategy::Compass));
    assert_eq!(
        output.warnings,
        vec![Warning::MergeAmbiguity {
            street_id: "77".to_string(),
            parts: 2
        }]
    );

    let indices: Vec<usize> = output.table.street("77").map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn output_respects_table_invariants() {
    let network = FakeNetwork::new(vec![
        segment("1", Some("Avenue A"), RoadClass::Residential, &[(20.0, 20.0), (20.0, 180.0), (140.0, 260.0)]),
        segment("2", Some("Boulevard B"), RoadClass::Primary, &[(0.0, 350.0), (390.0, 330.0)]),
        segment("2", Some("Boulevard B"), RoadClass::Primary, &[(390.0, 330.0), (395.0, 100.0)]),
        segment("3", None, RoadClass::Unclassified, &[(300.0, 50.0), (300.5, 50.0)]),
        segment("4", Some("Footpath"), RoadClass::Other("footway".into()), &[(100.0, 100.0), (150.0, 150.0)]),
        segment("5", Some("Service lane"), RoadClass::Service, &[(10.0, 300.0), (60.0, 300.0)]),
    ]);
    let config = config(3.0, HeadingStrategy::Compass);
    let output = run(&network, &config);
    let allowed = config.allowed_set();

    let mut seen_order: Vec<&str> = Vec::new();
    for point in output.table.points() {
        assert!(allowed.contains(&point.class), "class {} leaked", point.class);
        assert!((0.0..360.0).contains(&point.heading_deg));
        if seen_order.last() != Some(&point.street_id.as_str()) {
            assert!(!seen_order.contains(&point.street_id.as_str()), "street split in table");
            seen_order.push(&point.street_id);
        }
    }
    assert_eq!(seen_order, vec!["1", "2", "3"]);

    for id in ["1", "2", "3"] {
        let points: Vec<&SampledPoint> = output.table.street(id).collect();
        let indices: Vec<usize> = points.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..points.len()).collect::<Vec<_>>());
        if points.len() >= 2 {
            assert_eq!(points[0].heading_deg, points[1].heading_deg);
        }
        let distinct: HashSet<(u64, u64)> = points
            .iter()
            .map(|p| (p.x_m.to_bits(), p.y_m.to_bits()))
            .collect();
        assert_eq!(distinct.len(), points.len());
    }
}

#[test]
fn geographic_columns_match_metric_columns() {
    let network = FakeNetwork::new(vec![segment(
        "9",
        None,
        RoadClass::Residential,
        &[(0.0, 0.0), (0.0, 40.0)],
    )]);
    let output = run(&network, &config(5.0, HeadingStrategy::Compass));
    let projection = common::projection();

    for point in output.table.points() {
        let metric = projection.forward(geo::Coord {
            x: point.lon,
            y: point.lat,
        });
        assert!((metric.x - point.x_m).abs() < 1e-6);
        assert!((metric.y - point.y_m).abs() < 1e-6);
    }
}

#[test]
fn request_uses_large_region_and_network_flags() {
    let network = FakeNetwork::new(vec![]);
    let config = PipelineConfig {
        retain_all: false,
        network_type: NetworkType::DriveService,
        ..config(1.0, HeadingStrategy::Compass)
    };
    let output = run(&network, &config);

    let requests = network.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].retain_all);
    assert_eq!(requests[0].network_type, NetworkType::DriveService);
    assert_eq!(requests[0].polygon, output.region.large);
    assert_eq!(output.place.metric_crs().epsg(), 32618);
}

#[test]
fn empty_network_is_not_fatal() {
    // Entirely outside the 5 m inclusion buffer
    let network = FakeNetwork::new(vec![segment(
        "far",
        None,
        RoadClass::Residential,
        &[(600.0, 600.0), (700.0, 600.0)],
    )]);
    let output = run(&network, &config(1.0, HeadingStrategy::Compass));
    assert!(output.table.is_empty());
    assert_eq!(output.warnings, vec![Warning::EmptyNetwork]);
}

#[test]
fn unknown_place_aborts_before_network_call() {
    let network = FakeNetwork::new(vec![]);
    let config = PipelineConfig {
        place: "Atlantis".to_string(),
        ..PipelineConfig::default()
    };
    let result = extract_street_points(&config, &FakeGeocoder::new(), &network);
    assert!(matches!(result, Err(Error::PlaceNotFound(_))));
    assert!(network.requests.borrow().is_empty());
}

#[test]
fn collaborator_failure_is_surfaced() {
    let network = FakeNetwork::unavailable();
    let result = extract_street_points(
        &config(1.0, HeadingStrategy::Compass),
        &FakeGeocoder::new(),
        &network,
    );
    assert!(matches!(result, Err(Error::CollaboratorUnavailable(_))));
}

#[test]
fn invalid_config_fails_before_geocoding() {
    let geocoder = FakeGeocoder::new();
    let config = PipelineConfig {
        sampling_distance: -1.0,
        ..PipelineConfig::default()
    };
    let result = extract_street_points(&config, &geocoder, &FakeNetwork::new(vec![]));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert_eq!(geocoder.calls.get(), 0);
}
