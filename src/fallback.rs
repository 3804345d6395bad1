//! Provider combinator that patches unreachable pairs from a second source.

use crate::error::MatrixError;
use crate::matrix::CostMatrix;
use crate::traits::{CostMatrixProvider, PointOfInterest};

/// Uses `primary` and fills each unreachable off-diagonal pair from `fallback`.
///
/// The usual pairing is an [`OsrmClient`](crate::osrm::OsrmClient) backed by a
/// [`HaversineMatrix`](crate::haversine::HaversineMatrix), so that pairs the
/// street network cannot connect still get a walking estimate.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<Pr, F> CostMatrixProvider for WithFallback<Pr, F>
where
    Pr: CostMatrixProvider,
    F: CostMatrixProvider,
{
    fn cost_matrix<P: PointOfInterest>(&self, pois: &[P]) -> Result<CostMatrix, MatrixError> {
        let mut matrix = self.primary.cost_matrix(pois)?;
        let missing = matrix.unreachable_pairs();
        if missing == 0 {
            return Ok(matrix);
        }

        let backup = self.fallback.cost_matrix(pois)?;
        let n = matrix.len();
        for from in 0..n {
            for to in 0..n {
                if from != to && matrix.cost(from, to).is_none() {
                    matrix.set(from, to, backup.cost(from, to));
                }
            }
        }

        tracing::info!(
            filled = missing - matrix.unreachable_pairs(),
            remaining = matrix.unreachable_pairs(),
            "filled unreachable pairs from fallback provider"
        );
        Ok(matrix)
    }
}
