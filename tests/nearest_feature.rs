mod common;

use proptest::prelude::*;
use quakezone::compute::haversine_km;
use quakezone::compute::nearest::{FAULT_FALLBACK_KM, VOLCANO_FALLBACK_KM};
use quakezone::{FeatureKind, GeoCoord, NearestFeatureIndex, QuakeError};

fn java_faults() -> NearestFeatureIndex {
    NearestFeatureIndex::from_lat_lon(
        FeatureKind::Fault,
        [(-7.0, 110.0), (-7.5, 110.5), (-8.0, 111.0)],
    )
    .unwrap()
}

#[test]
fn test_exact_location_and_small_offset() {
    let index = java_faults();

    assert!(index.nearest_distance_km(-7.0, 110.0) < 1.0);

    let d = index.nearest_distance_km(-7.1, 110.0);
    assert!((10.0..13.0).contains(&d), "distance was {}", d);
}

fn coord() -> impl Strategy<Value = GeoCoord> {
    (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lon)| GeoCoord::new(lat, lon))
}

proptest! {
    #[test]
    fn test_matches_brute_force_haversine(
        features in prop::collection::vec(coord(), 1..200),
        queries in prop::collection::vec(coord(), 1..20),
    ) {
        common::init_logger();
        let index = NearestFeatureIndex::build(FeatureKind::Volcano, features.clone()).unwrap();

        for query in queries {
            let expected = features
                .iter()
                .map(|f| haversine_km(query, *f))
                .fold(f64::INFINITY, f64::min);

            let found = index.nearest(query.lat, query.lon).unwrap();
            prop_assert!(
                (found.distance_km - expected).abs() < 1e-6,
                "query {:?}: got {} expected {}",
                query,
                found.distance_km,
                expected
            );
            prop_assert_eq!(found.coord, features[found.index]);
        }
    }

    #[test]
    fn test_distances_are_non_negative_and_symmetric(a in coord(), b in coord()) {
        let ab = haversine_km(a, b);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - haversine_km(b, a)).abs() < 1e-9);
        prop_assert!(ab <= std::f64::consts::PI * 6371.0 + 1e-6);
    }

    #[test]
    fn test_empty_indexes_use_fallbacks_everywhere(c in coord()) {
        let faults = NearestFeatureIndex::build(FeatureKind::Fault, Vec::new()).unwrap();
        let volcanoes = NearestFeatureIndex::build(FeatureKind::Volcano, Vec::new()).unwrap();

        prop_assert!(faults.nearest(c.lat, c.lon).is_none());
        prop_assert_eq!(faults.nearest_distance_km(c.lat, c.lon), FAULT_FALLBACK_KM);
        prop_assert_eq!(volcanoes.nearest_distance_km(c.lat, c.lon), VOLCANO_FALLBACK_KM);
    }
}

#[test]
fn test_fallback_constants() {
    assert_eq!(FAULT_FALLBACK_KM, 200.0);
    assert_eq!(VOLCANO_FALLBACK_KM, 150.0);
}

#[test]
fn test_single_feature_everywhere() {
    let index = NearestFeatureIndex::from_lat_lon(FeatureKind::Volcano, [(-7.54, 110.44)]).unwrap();
    let origin = GeoCoord::new(-7.54, 110.44);

    for (lat, lon) in [(0.0, 0.0), (-7.54, -69.56), (89.0, 110.44), (-7.0, 111.0)] {
        let expected = haversine_km(GeoCoord::new(lat, lon), origin);
        let found = index.nearest_distance_km(lat, lon);
        assert!((found - expected).abs() < 1e-6);
    }
}

#[test]
fn test_rejects_out_of_range_features() {
    let result = NearestFeatureIndex::from_lat_lon(FeatureKind::Fault, [(-7.0, 110.0), (95.0, 0.0)]);
    match result {
        Err(QuakeError::InvalidInput(msg)) => assert!(msg.contains("index 1"), "message: {}", msg),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}
