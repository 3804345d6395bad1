//! itinerary-planner
//!
//! Plans a single sightseeing day from scored points of interest: an exact
//! slot assignment picks what to visit and when, then a best-first search
//! orders the chosen stops to minimise walking time.

pub mod assigner;
pub mod calendar;
pub mod diagnostics;
pub mod error;
pub mod fallback;
pub mod haversine;
pub mod matrix;
pub mod orderer;
pub mod osrm;
pub mod planner;
pub mod poi;
pub mod traits;

pub use assigner::{AssignOptions, Assignment, SlotAssigner};
pub use calendar::{SlotCalendar, TimeSlot};
pub use error::{AssignError, InputError, MatrixError, PlanError, RouteError};
pub use matrix::CostMatrix;
pub use orderer::{Heuristic, OrderOptions, Route, RouteOrderer};
pub use planner::{plan, plan_batch, Itinerary, PlanRequest};
pub use poi::{OpeningWindow, PoiKind, PoiRecord};
pub use traits::{CostMatrixProvider, PointOfInterest};
