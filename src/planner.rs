//! End-to-end day planning: assign slots, order the chosen stops, check.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assigner::{AssignOptions, Assignment, SlotAssigner};
use crate::calendar::{SlotCalendar, TimeSlot};
use crate::diagnostics::{check_itinerary, DiagnosticsConfig, Warning};
use crate::error::PlanError;
use crate::haversine::HaversineMatrix;
use crate::matrix::CostMatrix;
use crate::orderer::{OrderOptions, Route, RouteOrderer, RouteStep};
use crate::poi::{PoiKind, PoiRecord};
use crate::traits::{CostMatrixProvider, PointOfInterest};

/// Everything needed to plan one day.
///
/// Only `pois` is required. Without a `matrix`, walking times are
/// estimated from the POI coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub city: Option<String>,
    pub pois: Vec<PoiRecord>,
    #[serde(default)]
    pub calendar: SlotCalendar,
    #[serde(default)]
    pub assign: AssignOptions,
    #[serde(default)]
    pub order: OrderOptions,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub matrix: Option<CostMatrix>,
}

impl PlanRequest {
    pub fn new(pois: Vec<PoiRecord>) -> Self {
        Self {
            city: None,
            pois,
            calendar: SlotCalendar::default(),
            assign: AssignOptions::default(),
            order: OrderOptions::default(),
            diagnostics: DiagnosticsConfig::default(),
            matrix: None,
        }
    }

    pub fn with_matrix(mut self, matrix: CostMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A route stop together with the slot it was assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryStop {
    pub poi_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: PoiKind,
    pub score: f64,
    pub cumulative_cost_seconds: u64,
    pub slot: TimeSlot,
    /// Upstream cluster label of the POI, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Stops in visiting order.
    pub stops: Vec<ItineraryStop>,
    pub assignment: Assignment,
    pub route: Route,
    pub warnings: Vec<Warning>,
}

impl Itinerary {
    pub fn total_cost_seconds(&self) -> u64 {
        self.route.total_cost_seconds
    }

    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Plan one day, estimating missing walking times by great-circle distance.
pub fn plan(request: &PlanRequest) -> Result<Itinerary, PlanError> {
    plan_with(request, &HaversineMatrix::default())
}

/// Plan one day, asking `provider` for walking times when the request
/// carries no matrix.
#[tracing::instrument(level = "info", name = "Plan Day", skip_all, fields(city = request.city.as_deref().unwrap_or("-"), pois = request.pois.len()))]
pub fn plan_with<M: CostMatrixProvider>(request: &PlanRequest, provider: &M) -> Result<Itinerary, PlanError> {
    let slots = request.calendar.slots()?;
    let assignment = SlotAssigner::new(request.assign.clone()).assign(&request.pois, &slots)?;

    // Route start is the stop in the earliest assigned slot.
    let chosen: Vec<&PoiRecord> = assignment
        .poi_indices()
        .into_iter()
        .map(|index| &request.pois[index])
        .collect();

    let route = if chosen.len() == 1 {
        single_stop_route(chosen[0])
    } else {
        let fetched;
        let matrix = match &request.matrix {
            Some(matrix) => matrix,
            None => {
                fetched = provider.cost_matrix(&chosen)?;
                &fetched
            }
        };
        RouteOrderer::new(request.order.clone()).order(&chosen, matrix)?
    };

    let stops: Vec<ItineraryStop> = route
        .steps
        .iter()
        .map(|step| ItineraryStop {
            poi_id: step.poi_id.clone(),
            label: step.label.clone(),
            kind: step.kind,
            score: step.score,
            cumulative_cost_seconds: step.cumulative_cost_seconds,
            slot: assignment.slots[step.poi_index].slot,
            cluster: chosen[step.poi_index].cluster,
        })
        .collect();
    let warnings = check_itinerary(&stops, &request.diagnostics);

    tracing::info!(
        stops = stops.len(),
        objective = assignment.objective,
        walk_seconds = route.total_cost_seconds,
        warnings = warnings.len(),
        "planned day"
    );

    Ok(Itinerary {
        city: request.city.clone(),
        stops,
        assignment,
        route,
        warnings,
    })
}

/// Plan independent requests in parallel; results keep the input order.
pub fn plan_batch(requests: &[PlanRequest]) -> Vec<Result<Itinerary, PlanError>> {
    requests.par_iter().map(plan).collect()
}

fn single_stop_route<P: PointOfInterest>(poi: &P) -> Route {
    Route {
        steps: vec![RouteStep {
            poi_id: poi.id().to_string(),
            label: poi.label().to_string(),
            kind: poi.kind(),
            score: poi.score(),
            cumulative_cost_seconds: 0,
            poi_index: 0,
        }],
        total_cost_seconds: 0,
        pruned: Vec::new(),
        expansions: 0,
        certified_optimal: true,
    }
}
