//! Minimum transit-cost visiting order.
//!
//! Finds an open Hamiltonian path over the given stops that starts at the
//! first stop, using best-first search over `(visited set, last stop)`
//! states. The state space is `2^N * N`, so the search is meant for a single
//! day's worth of stops. With the default options and
//! [`Heuristic::MinOutgoingEdge`], about 18 stops on a walking matrix is the
//! practical limit: larger inputs end in [`RouteError::SearchExhausted`]
//! once the expansion or wall-clock cap is hit. More than
//! [`MAX_ROUTE_STOPS`] stops are refused outright.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{InputError, RouteError};
use crate::matrix::CostMatrix;
use crate::poi::PoiKind;
use crate::traits::PointOfInterest;

/// Visited sets are stored as `u64` bitmasks.
pub const MAX_ROUTE_STOPS: usize = 64;

const CLOCK_CHECK_INTERVAL: u64 = 1024;

/// Remaining-cost estimate used to rank frontier states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Heuristic {
    /// Cheapest finite edge leaving the next stop.
    ///
    /// Cheap and effective on walking matrices, but it can overestimate
    /// (for instance on the final leg), so the result is not certified
    /// optimal.
    #[default]
    MinOutgoingEdge,
    /// Sum of the cheapest finite edge entering each still-unvisited stop.
    ///
    /// Every unvisited stop must still be entered once, so this never
    /// overestimates and the returned path is optimal.
    MinIncomingSum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderOptions {
    pub heuristic: Heuristic,
    /// Cap on expanded states; `None` searches until the frontier empties.
    pub max_expansions: Option<u64>,
    /// Wall-clock cap in milliseconds; `None` disables it.
    pub time_budget_ms: Option<u64>,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            max_expansions: Some(1_000_000),
            time_budget_ms: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub poi_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: PoiKind,
    pub score: f64,
    pub cumulative_cost_seconds: u64,
    /// Position of the POI in the orderer input.
    #[serde(skip)]
    pub poi_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub total_cost_seconds: u64,
    /// Ids of isolated stops removed before the search.
    pub pruned: Vec<String>,
    pub expansions: u64,
    /// Whether the heuristic used guarantees a minimum-cost path.
    pub certified_optimal: bool,
}

impl Route {
    pub fn pruned_count(&self) -> usize {
        self.pruned.len()
    }

    pub fn poi_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.poi_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteOrderer {
    options: OrderOptions,
}

impl RouteOrderer {
    pub fn new(options: OrderOptions) -> Self {
        Self { options }
    }

    /// Order `pois`, starting from `pois[0]`.
    ///
    /// Stops without any finite edge to or from another stop are pruned and
    /// reported in [`Route::pruned`]. If the start itself is isolated, the
    /// first remaining stop becomes the start.
    ///
    /// A stop with only incoming edges is kept even though it has no
    /// outgoing edge. It can still close the path as its last stop, so
    /// counting outgoing edges alone would drop a reachable sink.
    #[tracing::instrument(level = "debug", name = "Route Ordering", skip_all, fields(stops = pois.len()))]
    pub fn order<P: PointOfInterest>(&self, pois: &[P], matrix: &CostMatrix) -> Result<Route, RouteError> {
        let rows = matrix_rows(pois, matrix)?;
        let n = pois.len();
        let edge = |a: usize, b: usize| matrix.cost(rows[a], rows[b]);

        let (keep, pruned): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| {
            (0..n).any(|j| j != i && (edge(i, j).is_some() || edge(j, i).is_some()))
        });
        let pruned: Vec<String> = pruned.into_iter().map(|i| pois[i].id().to_string()).collect();
        if !pruned.is_empty() {
            tracing::warn!(count = pruned.len(), ids = ?pruned, "pruned isolated stops");
        }
        if keep.len() < 2 {
            return Err(RouteError::TooFewReachablePois {
                remaining: keep.len(),
                pruned: pruned.len(),
            });
        }
        if keep.len() > MAX_ROUTE_STOPS {
            return Err(InputError::TooManyPois {
                count: keep.len(),
                max: MAX_ROUTE_STOPS,
            }
            .into());
        }

        let graph = Graph::new(keep.len(), |a, b| edge(keep[a], keep[b]));
        let outcome = self.search(&graph)?;

        let mut steps = Vec::with_capacity(outcome.path.len());
        let mut cumulative = 0_u64;
        let mut previous: Option<usize> = None;
        for &local in &outcome.path {
            if let Some(prev) = previous {
                cumulative += graph.cost(prev, local).map_or(0, u64::from);
            }
            let poi_index = keep[local];
            let poi = &pois[poi_index];
            steps.push(RouteStep {
                poi_id: poi.id().to_string(),
                label: poi.label().to_string(),
                kind: poi.kind(),
                score: poi.score(),
                cumulative_cost_seconds: cumulative,
                poi_index,
            });
            previous = Some(local);
        }

        tracing::debug!(
            stops = steps.len(),
            total_cost_seconds = cumulative,
            expansions = outcome.expansions,
            "route ordering finished"
        );

        Ok(Route {
            steps,
            total_cost_seconds: cumulative,
            pruned,
            expansions: outcome.expansions,
            certified_optimal: self.options.heuristic == Heuristic::MinIncomingSum,
        })
    }

    fn search(&self, graph: &Graph) -> Result<SearchOutcome, RouteError> {
        let n = graph.len();
        let goal: u64 = if n == MAX_ROUTE_STOPS { u64::MAX } else { (1_u64 << n) - 1 };
        let started = Instant::now();
        let time_budget = self.options.time_budget_ms.map(Duration::from_millis);

        // Expanded states, linked to their predecessor for path recovery.
        let mut expanded: Vec<(usize, Option<usize>)> = Vec::new();
        let mut best_g: HashMap<(u64, usize), u64> = HashMap::new();
        let mut frontier = BinaryHeap::new();
        frontier.push(Frontier {
            f: 0,
            g: 0,
            mask: 1,
            last: 0,
            parent: None,
        });

        let mut expansions = 0_u64;
        while let Some(state) = frontier.pop() {
            if state.mask == goal {
                let mut path = vec![state.last];
                let mut cursor = state.parent;
                while let Some(id) = cursor {
                    let (stop, parent) = expanded[id];
                    path.push(stop);
                    cursor = parent;
                }
                path.reverse();
                return Ok(SearchOutcome { path, expansions });
            }

            let key = (state.mask, state.last);
            if best_g.get(&key).is_some_and(|&g| g <= state.g) {
                continue;
            }
            best_g.insert(key, state.g);

            if self.options.max_expansions.is_some_and(|cap| expansions >= cap) {
                return Err(RouteError::SearchExhausted { expansions });
            }
            if let Some(budget) = time_budget
                && expansions % CLOCK_CHECK_INTERVAL == 0
                && started.elapsed() >= budget
            {
                return Err(RouteError::SearchExhausted { expansions });
            }
            expansions += 1;

            let id = expanded.len();
            expanded.push((state.last, state.parent));

            for next in 0..n {
                if state.mask & (1 << next) != 0 {
                    continue;
                }
                let Some(cost) = graph.cost(state.last, next) else {
                    continue;
                };
                let g = state.g + u64::from(cost);
                let mask = state.mask | (1 << next);
                if best_g.get(&(mask, next)).is_some_and(|&best| best <= g) {
                    continue;
                }
                let h = match self.options.heuristic {
                    Heuristic::MinOutgoingEdge => graph.min_out[next],
                    Heuristic::MinIncomingSum => graph.unvisited_min_in(mask, goal),
                };
                frontier.push(Frontier {
                    f: g + h,
                    g,
                    mask,
                    last: next,
                    parent: Some(id),
                });
            }
        }

        Err(RouteError::DisconnectedGraph { expansions })
    }
}

/// Matrix row for each input POI, rejecting ids the matrix does not index.
fn matrix_rows<P: PointOfInterest>(pois: &[P], matrix: &CostMatrix) -> Result<Vec<usize>, InputError> {
    if pois.is_empty() {
        return Err(InputError::EmptyPoiSet);
    }
    let mut seen = HashSet::with_capacity(pois.len());
    pois.iter()
        .map(|poi| {
            if !seen.insert(poi.id()) {
                return Err(InputError::DuplicatePoi(poi.id().to_string()));
            }
            matrix
                .index_of(poi.id())
                .ok_or_else(|| InputError::UnknownPoi(poi.id().to_string()))
        })
        .collect()
}

/// Dense local cost table over the working stops.
struct Graph {
    n: usize,
    costs: Vec<Option<u32>>,
    min_out: Vec<u64>,
    min_in: Vec<u64>,
}

impl Graph {
    fn new(n: usize, edge: impl Fn(usize, usize) -> Option<u32>) -> Self {
        let mut costs = vec![None; n * n];
        for a in 0..n {
            for b in 0..n {
                if a != b {
                    costs[a * n + b] = edge(a, b);
                }
            }
        }
        // A stop without finite edges in that direction contributes nothing.
        let min_out = (0..n)
            .map(|a| (0..n).filter_map(|b| costs[a * n + b]).min().map_or(0, u64::from))
            .collect();
        let min_in = (0..n)
            .map(|b| (0..n).filter_map(|a| costs[a * n + b]).min().map_or(0, u64::from))
            .collect();
        Self {
            n,
            costs,
            min_out,
            min_in,
        }
    }

    fn len(&self) -> usize {
        self.n
    }

    fn cost(&self, from: usize, to: usize) -> Option<u32> {
        self.costs[from * self.n + to]
    }

    fn unvisited_min_in(&self, mask: u64, goal: u64) -> u64 {
        let mut remaining = goal & !mask;
        let mut total = 0;
        while remaining != 0 {
            let stop = remaining.trailing_zeros() as usize;
            total += self.min_in[stop];
            remaining &= remaining - 1;
        }
        total
    }
}

struct SearchOutcome {
    path: Vec<usize>,
    expansions: u64,
}

/// Frontier entry; the heap pops the smallest `(f, g, mask, last)` first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f: u64,
    g: u64,
    mask: u64,
    last: usize,
    parent: Option<usize>,
}

impl Frontier {
    fn rank(&self) -> (u64, u64, u64, usize) {
        (self.f, self.g, self.mask, self.last)
    }
}

impl Eq for Frontier {}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
