//! Core domain traits for the itinerary planner.
//!
//! These are intentionally minimal. Upstream scorers and harvesters may keep
//! their own record types and implement [`PointOfInterest`] for them.

use crate::error::MatrixError;
use crate::matrix::CostMatrix;
use crate::poi::{OpeningWindow, PoiKind};

/// A visitable place with a desirability score.
pub trait PointOfInterest {
    /// Stable identifier, also the key into the cost matrix index.
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    fn kind(&self) -> PoiKind;

    /// Final desirability score in `[0, 1]`.
    fn score(&self) -> f64;

    /// Opening window in whole hours, `None` when always open.
    fn opening_window(&self) -> Option<OpeningWindow>;

    /// Location coordinates (lat, lng), needed only by matrix providers.
    fn location(&self) -> Option<(f64, f64)> {
        None
    }
}

/// Provides a transit-cost matrix for a set of points of interest.
///
/// The returned matrix is indexed by the ids of `pois`, in the given order.
pub trait CostMatrixProvider {
    fn cost_matrix<P: PointOfInterest>(&self, pois: &[P]) -> Result<CostMatrix, MatrixError>;
}

impl<T: PointOfInterest + ?Sized> PointOfInterest for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn label(&self) -> &str {
        (**self).label()
    }

    fn kind(&self) -> PoiKind {
        (**self).kind()
    }

    fn score(&self) -> f64 {
        (**self).score()
    }

    fn opening_window(&self) -> Option<OpeningWindow> {
        (**self).opening_window()
    }

    fn location(&self) -> Option<(f64, f64)> {
        (**self).location()
    }
}

/// Collect the locations of `pois`, failing on the first one without coordinates.
pub(crate) fn locations_of<P: PointOfInterest>(pois: &[P]) -> Result<Vec<(f64, f64)>, MatrixError> {
    pois.iter()
        .map(|poi| {
            poi.location()
                .ok_or_else(|| MatrixError::MissingLocation(poi.id().to_string()))
        })
        .collect()
}
