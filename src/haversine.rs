//! Great-circle walking-time estimates.
//!
//! Ignores the street network, so legs come out shorter than on foot, but
//! needs nothing beyond POI coordinates.

use rayon::prelude::*;

use crate::error::{InputError, MatrixError};
use crate::matrix::CostMatrix;
use crate::traits::{locations_of, CostMatrixProvider, PointOfInterest};

/// Typical sightseeing pace in km/h.
const DEFAULT_SPEED_KMH: f64 = 5.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Cost matrix provider that walks in straight lines at a fixed speed.
///
/// Every pair is reachable.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two `(lat, lng)` points in kilometers.
    pub fn haversine_km((lat1, lng1): (f64, f64), (lat2, lng2): (f64, f64)) -> f64 {
        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let half_dphi = (phi2 - phi1) / 2.0;
        let half_dlambda = (lng2 - lng1).to_radians() / 2.0;

        let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    fn km_to_seconds(&self, km: f64) -> u32 {
        (km / self.speed_kmh * 3600.0).round() as u32
    }

    /// Estimated seconds between two locations.
    pub fn seconds_between(&self, from: (f64, f64), to: (f64, f64)) -> u32 {
        self.km_to_seconds(Self::haversine_km(from, to))
    }
}

impl CostMatrixProvider for HaversineMatrix {
    fn cost_matrix<P: PointOfInterest>(&self, pois: &[P]) -> Result<CostMatrix, MatrixError> {
        if !(self.speed_kmh.is_finite() && self.speed_kmh > 0.0) {
            return Err(InputError::InvalidOption("walking speed must be positive").into());
        }
        let locations = locations_of(pois)?;
        let ids: Vec<String> = pois.iter().map(|poi| poi.id().to_string()).collect();

        let rows: Vec<Vec<Option<u32>>> = locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| Some(if i == j { 0 } else { self.seconds_between(*from, *to) }))
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(CostMatrix::new(ids, rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::{PoiKind, PoiRecord};

    fn poi(id: &str, lat: f64, lng: f64) -> PoiRecord {
        PoiRecord::new(id, id, PoiKind::Monument, 0.5).at(lat, lng)
    }

    #[test]
    fn zero_distance_to_itself() {
        let dist = HaversineMatrix::haversine_km((41.89, 12.49), (41.89, 12.49));
        assert!(dist < 0.001);
    }

    #[test]
    fn colosseum_to_st_peters() {
        // About 3.2 km as the crow flies.
        let dist = HaversineMatrix::haversine_km((41.8902, 12.4922), (41.9022, 12.4568));
        assert!((2.9..3.5).contains(&dist), "got {dist} km");
    }

    #[test]
    fn every_pair_is_reachable() {
        let provider = HaversineMatrix::default();
        let pois = vec![poi("a", 41.89, 12.49), poi("b", 41.90, 12.48), poi("c", 41.91, 12.47)];
        let matrix = provider.cost_matrix(&pois).unwrap();

        for i in 0..pois.len() {
            assert_eq!(matrix.cost(i, i), Some(0));
        }
        assert_eq!(matrix.unreachable_pairs(), 0);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let pois = vec![poi("a", 41.89, 12.49), poi("b", 41.90, 12.48)];
        let err = HaversineMatrix::new(0.0).cost_matrix(&pois).unwrap_err();
        assert!(matches!(err, MatrixError::Input(InputError::InvalidOption(_))));
    }

    #[test]
    fn estimates_are_symmetric() {
        let provider = HaversineMatrix::default();
        let pois = vec![poi("a", 41.89, 12.49), poi("b", 41.90, 12.48)];
        let matrix = provider.cost_matrix(&pois).unwrap();
        assert_eq!(matrix.cost(0, 1), matrix.cost(1, 0));
    }

    #[test]
    fn one_kilometre_takes_twelve_minutes() {
        assert_eq!(HaversineMatrix::new(5.0).km_to_seconds(1.0), 720);
    }

    #[test]
    fn missing_location_is_an_error() {
        let pois = vec![poi("a", 41.89, 12.49), PoiRecord::new("b", "b", PoiKind::Park, 0.1)];
        let err = HaversineMatrix::default().cost_matrix(&pois).unwrap_err();
        assert!(matches!(err, MatrixError::MissingLocation(id) if id == "b"));
    }
}
