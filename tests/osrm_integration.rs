//! Live OSRM checks.
//!
//! Needs an `osrm-routed` instance with a foot profile covering central
//! Rome, for example the Geofabrik `europe/italy/centro` extract. Point
//! `OSRM_BASE_URL` at it and run with `cargo test -- --ignored`.

mod fixtures;

use std::env;

use fixtures::{ANCIENT, OUTDOORS};
use itinerary_planner::fallback::WithFallback;
use itinerary_planner::haversine::HaversineMatrix;
use itinerary_planner::orderer::RouteOrderer;
use itinerary_planner::osrm::{OsrmClient, OsrmConfig};
use itinerary_planner::poi::PoiRecord;
use itinerary_planner::traits::CostMatrixProvider;

fn client(max_batch: usize) -> OsrmClient {
    let base_url = env::var("OSRM_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    OsrmClient::new(OsrmConfig {
        base_url,
        timeout_secs: 10,
        max_batch,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client")
}

fn sights() -> Vec<PoiRecord> {
    ANCIENT.iter().chain(OUTDOORS).map(|s| s.record()).collect()
}

#[test]
#[ignore = "requires a running OSRM server"]
fn osrm_table_returns_walking_matrix() {
    let pois = sights();
    let matrix = client(100).cost_matrix(&pois).expect("fetch OSRM matrix");

    assert_eq!(matrix.len(), pois.len());
    for i in 0..pois.len() {
        assert_eq!(matrix.cost(i, i), Some(0));
    }
    // Colosseum to the Forum is a short walk.
    let leg = matrix.cost_between("colosseum", "forum").unwrap().unwrap();
    assert!(leg > 60 && leg < 1800, "unexpected walk of {leg}s");
}

#[test]
#[ignore = "requires a running OSRM server"]
fn batched_requests_match_single_table() {
    let pois = sights();
    let whole = client(100).cost_matrix(&pois).expect("fetch OSRM matrix");
    let batched = client(4).cost_matrix(&pois).expect("fetch batched OSRM matrix");
    assert_eq!(whole, batched);
}

#[test]
#[ignore = "requires a running OSRM server"]
fn osrm_matrix_feeds_route_ordering() {
    let pois = sights();
    let provider = WithFallback::new(client(100), HaversineMatrix::default());
    let matrix = provider.cost_matrix(&pois).expect("fetch matrix");
    assert_eq!(matrix.unreachable_pairs(), 0);

    let route = RouteOrderer::default().order(&pois, &matrix).expect("order route");
    assert_eq!(route.steps.len(), pois.len());
    assert_eq!(route.steps[0].poi_id, "colosseum");
}
