#![allow(dead_code)]

//! Test fixtures for itinerary-planner.
//!
//! Provides realistic test data including:
//! - Real central Rome sights (coordinates from OpenStreetMap)
//! - Builders for POIs and hand-written cost matrices

pub mod rome_pois;

pub use rome_pois::*;

use itinerary_planner::matrix::CostMatrix;
use itinerary_planner::poi::{PoiKind, PoiRecord};

/// POI that is always open.
pub fn poi(id: &str, kind: PoiKind, score: f64) -> PoiRecord {
    PoiRecord::new(id, id, kind, score)
}

/// POI open between two whole hours.
pub fn open_poi(id: &str, kind: PoiKind, score: f64, open: u8, close: u8) -> PoiRecord {
    poi(id, kind, score)
        .with_hours(&format!("{open:02}:00"), &format!("{close:02}:00"))
        .expect("fixture hours are valid")
}

/// Matrix over `ids` from rows where `None` marks an unreachable pair.
pub fn matrix(ids: &[&str], rows: Vec<Vec<Option<u32>>>) -> CostMatrix {
    CostMatrix::new(ids.iter().map(|id| id.to_string()).collect(), rows).expect("fixture matrix is valid")
}

/// Fully connected matrix from a dense table of seconds.
pub fn dense_matrix(ids: &[&str], rows: &[&[u32]]) -> CostMatrix {
    matrix(
        ids,
        rows.iter()
            .map(|row| row.iter().copied().map(Some).collect())
            .collect(),
    )
}
