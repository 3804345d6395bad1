//! Pairwise transit-cost matrix keyed by point-of-interest id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Reserved internal value for "no usable route".
const UNREACHABLE: u32 = u32::MAX;

/// Square matrix of transit costs in seconds.
///
/// Rows and columns are addressed through an explicit id → index map, so a
/// caller can never silently read a row that belongs to another POI.
/// Unreachable pairs are `None` at the API boundary. The matrix need not be
/// symmetric and the diagonal is never consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCostMatrix", into = "RawCostMatrix")]
pub struct CostMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    costs: Vec<u32>,
}

impl CostMatrix {
    pub fn new(ids: Vec<String>, rows: Vec<Vec<Option<u32>>>) -> Result<Self, InputError> {
        let n = ids.len();
        if rows.len() != n {
            return Err(InputError::MatrixIdMismatch {
                ids: n,
                rows: rows.len(),
            });
        }

        let mut index = HashMap::with_capacity(n);
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(InputError::DuplicateMatrixId(id.clone()));
            }
        }

        let mut costs = Vec::with_capacity(n * n);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(InputError::MatrixNotSquare {
                    row: row_idx,
                    len: row.len(),
                    expected: n,
                });
            }
            for (col_idx, value) in row.into_iter().enumerate() {
                costs.push(match value {
                    Some(UNREACHABLE) => {
                        return Err(InputError::InvalidCost {
                            row: row_idx,
                            col: col_idx,
                        });
                    }
                    Some(cost) => cost,
                    None => UNREACHABLE,
                });
            }
        }

        Ok(Self { ids, index, costs })
    }

    /// Matrix with every off-diagonal pair unreachable.
    pub fn unreachable(ids: Vec<String>) -> Result<Self, InputError> {
        let n = ids.len();
        let rows: Vec<Vec<Option<u32>>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { Some(0) } else { None }).collect())
            .collect();
        Self::new(ids, rows)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Cost from row `from` to column `to`, `None` if unreachable.
    pub fn cost(&self, from: usize, to: usize) -> Option<u32> {
        let value = self.costs[from * self.len() + to];
        (value != UNREACHABLE).then_some(value)
    }

    /// Cost between two POIs by id; `Err` if either id is not indexed.
    pub fn cost_between(&self, from: &str, to: &str) -> Result<Option<u32>, InputError> {
        let from = self
            .index_of(from)
            .ok_or_else(|| InputError::UnknownPoi(from.to_string()))?;
        let to = self
            .index_of(to)
            .ok_or_else(|| InputError::UnknownPoi(to.to_string()))?;
        Ok(self.cost(from, to))
    }

    pub(crate) fn set(&mut self, from: usize, to: usize, cost: Option<u32>) {
        let n = self.len();
        self.costs[from * n + to] = match cost {
            Some(value) => value.min(UNREACHABLE - 1),
            None => UNREACHABLE,
        };
    }

    /// Number of unreachable off-diagonal pairs.
    pub fn unreachable_pairs(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j && self.cost(i, j).is_none())
            .count()
    }

    pub fn rows(&self) -> Vec<Vec<Option<u32>>> {
        let n = self.len();
        (0..n)
            .map(|i| (0..n).map(|j| self.cost(i, j)).collect())
            .collect()
    }
}

/// Wire shape: `{"ids": [...], "costs": [[seconds | null]]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCostMatrix {
    ids: Vec<String>,
    costs: Vec<Vec<Option<f64>>>,
}

impl TryFrom<RawCostMatrix> for CostMatrix {
    type Error = InputError;

    fn try_from(raw: RawCostMatrix) -> Result<Self, Self::Error> {
        let mut rows = Vec::with_capacity(raw.costs.len());
        for (row_idx, row) in raw.costs.into_iter().enumerate() {
            let mut converted = Vec::with_capacity(row.len());
            for (col_idx, value) in row.into_iter().enumerate() {
                converted.push(match value {
                    None => None,
                    Some(seconds) if seconds.is_infinite() && seconds > 0.0 => None,
                    Some(seconds) if seconds.is_finite() && seconds >= 0.0 && seconds < f64::from(UNREACHABLE - 1) => {
                        Some(seconds.round() as u32)
                    }
                    Some(_) => {
                        return Err(InputError::InvalidCost {
                            row: row_idx,
                            col: col_idx,
                        });
                    }
                });
            }
            rows.push(converted);
        }
        CostMatrix::new(raw.ids, rows)
    }
}

impl From<CostMatrix> for RawCostMatrix {
    fn from(matrix: CostMatrix) -> Self {
        let costs: Vec<Vec<Option<f64>>> = matrix
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(|value| value.map(f64::from)).collect())
            .collect();
        Self {
            ids: matrix.ids,
            costs,
        }
    }
}
