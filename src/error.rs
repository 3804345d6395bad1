//! Error taxonomy for the itinerary solver.
//!
//! Input problems are detected before any search starts. Search outcomes
//! that produce no usable result are reported as their own variants and are
//! never replaced by a partial answer.

use thiserror::Error;

/// Malformed or inconsistent solver input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("at least one point of interest is required")]
    EmptyPoiSet,

    #[error("the slot calendar is empty")]
    EmptyCalendar,

    #[error("invalid calendar bounds {start}:00-{end}:00")]
    InvalidCalendar { start: u8, end: u8 },

    #[error("point of interest `{0}` appears more than once")]
    DuplicatePoi(String),

    #[error("score of `{id}` must lie in [0, 1], got {score}")]
    InvalidScore { id: String, score: String },

    #[error("malformed time `{0}`, expected HH:MM")]
    InvalidTime(String),

    #[error("`{0}` is not a known point-of-interest type")]
    UnknownKind(String),

    #[error("cost matrix has {ids} ids but {rows} rows")]
    MatrixIdMismatch { ids: usize, rows: usize },

    #[error("cost matrix row {row} has {len} entries, expected {expected}")]
    MatrixNotSquare { row: usize, len: usize, expected: usize },

    #[error("cost matrix entry ({row}, {col}) is not a non-negative number of seconds")]
    InvalidCost { row: usize, col: usize },

    #[error("cost matrix lists `{0}` more than once")]
    DuplicateMatrixId(String),

    #[error("point of interest `{0}` is not indexed by the cost matrix")]
    UnknownPoi(String),

    #[error("route search supports at most {max} stops, got {count}")]
    TooManyPois { count: usize, max: usize },

    #[error("invalid option: {0}")]
    InvalidOption(&'static str),
}

/// Failure of the slot assignment stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// No point of interest can be placed in any slot.
    #[error("no assignment satisfies the opening and diversity constraints")]
    InfeasibleAssignment,

    /// The budget elapsed before a single feasible assignment was found.
    #[error("time budget exhausted after {elapsed_ms} ms without a feasible assignment")]
    BudgetExhaustedWithoutSolution { elapsed_ms: u64 },

    /// The integer program solver failed for a reason other than infeasibility.
    #[error("assignment solver failed: {0}")]
    Solver(String),
}

/// Failure of the route ordering stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// The frontier emptied before every stop was visited.
    #[error("no finite-cost path visits every stop from the start ({expansions} states expanded)")]
    DisconnectedGraph { expansions: u64 },

    #[error("only {remaining} stop(s) left after pruning {pruned} isolated stop(s)")]
    TooFewReachablePois { remaining: usize, pruned: usize },

    /// The expansion or wall-clock cap was hit before reaching the goal.
    #[error("route search exhausted its budget after {expansions} expansions")]
    SearchExhausted { expansions: u64 },
}

/// Failure while building a cost matrix from an external source.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("point of interest `{0}` has no location")]
    MissingLocation(String),

    #[error("malformed routing response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Failure of the full itinerary pipeline.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Assign(#[from] AssignError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("malformed plan request: {0}")]
    Json(#[from] serde_json::Error),
}
