//! Exact slot assignment.
//!
//! Maps points of interest to hourly slots so that the total score is
//! maximal while respecting slot capacity, opening hours and type diversity.
//! The problem is a 0/1 program with one binary per eligible (slot, POI)
//! pair, solved by HiGHS through `good_lp` within the configured time budget.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::*;
use serde::{Deserialize, Serialize};

use crate::calendar::TimeSlot;
use crate::error::{AssignError, InputError};
use crate::poi::{validate_score, PoiKind};
use crate::traits::PointOfInterest;

/// Scores are compared in thousandths so that ties are exact.
const SCORE_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignOptions {
    /// Number of consecutive slots a diversity window spans.
    pub diversity_window: usize,
    /// Maximum POIs of one type inside any diversity window.
    pub diversity_cap: usize,
    /// Wall-clock budget for the solver in milliseconds.
    pub time_budget_ms: u64,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            diversity_window: 3,
            diversity_cap: 2,
            time_budget_ms: 10_000,
        }
    }
}

/// One occupied slot of an [`Assignment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedSlot {
    pub slot: TimeSlot,
    pub poi_id: String,
    #[serde(rename = "type")]
    pub kind: PoiKind,
    pub score: f64,
    /// Position of the POI in the solver input.
    #[serde(skip)]
    pub poi_index: usize,
}

/// Size of the generated program and the time spent solving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub variables: usize,
    pub constraints: usize,
    pub elapsed_ms: u64,
}

/// Partial injective slot → POI mapping, ordered by slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub slots: Vec<AssignedSlot>,
    /// Sum of the assigned scores.
    pub objective: f64,
    /// `false` when the budget ran out before optimality was proven.
    pub certified_optimal: bool,
    pub stats: SearchStats,
}

impl Assignment {
    /// Input positions of the assigned POIs, in slot order.
    pub fn poi_indices(&self) -> Vec<usize> {
        self.slots.iter().map(|assigned| assigned.poi_index).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotAssigner {
    options: AssignOptions,
}

impl SlotAssigner {
    pub fn new(options: AssignOptions) -> Self {
        Self { options }
    }

    #[tracing::instrument(level = "debug", name = "Slot Assignment", skip_all, fields(pois = pois.len(), slots = slots.len()))]
    pub fn assign<P: PointOfInterest>(
        &self,
        pois: &[P],
        slots: &[TimeSlot],
    ) -> Result<Assignment, AssignError> {
        validate_input(pois, slots, &self.options)?;

        let started = Instant::now();
        let budget = Duration::from_millis(self.options.time_budget_ms);
        let model = Model::build(pois, slots, &self.options);

        if budget.is_zero() {
            tracing::warn!("assignment budget is zero, solver not started");
            return Err(AssignError::BudgetExhaustedWithoutSolution { elapsed_ms: 0 });
        }
        if model.pairs.is_empty() {
            return Err(AssignError::InfeasibleAssignment);
        }

        let (picked, constraints) = model.solve(budget)?;
        let elapsed = started.elapsed();
        let outcome = if elapsed < budget {
            Outcome::Finished
        } else {
            Outcome::OutOfTime
        };
        let stats = SearchStats {
            variables: model.pairs.len(),
            constraints,
            elapsed_ms: elapsed.as_millis() as u64,
        };

        let chosen = settle(&model, &picked, outcome, stats.elapsed_ms)?;
        let certified_optimal = outcome == Outcome::Finished;
        if !certified_optimal {
            tracing::warn!(
                elapsed_ms = stats.elapsed_ms,
                "assignment budget exhausted, returning best feasible solution found"
            );
        }

        let assigned: Vec<AssignedSlot> = chosen
            .iter()
            .enumerate()
            .filter_map(|(position, choice)| {
                choice.map(|poi_index| {
                    let poi = &pois[poi_index];
                    AssignedSlot {
                        slot: slots[position],
                        poi_id: poi.id().to_string(),
                        kind: poi.kind(),
                        score: poi.score(),
                        poi_index,
                    }
                })
            })
            .collect();
        let objective = assigned.iter().map(|slot| slot.score).sum();

        tracing::debug!(
            assigned = assigned.len(),
            objective,
            certified = certified_optimal,
            variables = stats.variables,
            constraints = stats.constraints,
            "slot assignment finished"
        );

        Ok(Assignment {
            slots: assigned,
            objective,
            certified_optimal,
            stats,
        })
    }
}

fn validate_input<P: PointOfInterest>(
    pois: &[P],
    slots: &[TimeSlot],
    options: &AssignOptions,
) -> Result<(), InputError> {
    if pois.is_empty() {
        return Err(InputError::EmptyPoiSet);
    }
    if slots.is_empty() {
        return Err(InputError::EmptyCalendar);
    }
    if options.diversity_window == 0 {
        return Err(InputError::InvalidOption("diversity window must span at least one slot"));
    }

    let mut seen = HashSet::with_capacity(pois.len());
    for poi in pois {
        if !seen.insert(poi.id()) {
            return Err(InputError::DuplicatePoi(poi.id().to_string()));
        }
        validate_score(poi.id(), poi.score())?;
    }

    for slot in slots {
        if slot.start >= slot.end || slot.end > 24 {
            return Err(InputError::InvalidCalendar {
                start: slot.start,
                end: slot.end,
            });
        }
    }
    if let Some(pair) = slots.windows(2).find(|pair| pair[1].start < pair[0].end) {
        return Err(InputError::InvalidCalendar {
            start: pair[1].start,
            end: pair[1].end,
        });
    }
    Ok(())
}

/// How the solver call ended relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Finished,
    OutOfTime,
}

/// Read-only view of the assignment problem.
struct Model {
    weights: Vec<u64>,
    kinds: Vec<PoiKind>,
    slot_count: usize,
    /// Eligible (slot position, POI) pairs in slot then input order.
    pairs: Vec<(usize, usize)>,
    window: usize,
    cap: usize,
    /// Diversity windows exist only when the calendar spans a full window.
    diversity_active: bool,
}

impl Model {
    fn build<P: PointOfInterest>(pois: &[P], slots: &[TimeSlot], options: &AssignOptions) -> Self {
        let weights = pois
            .iter()
            .map(|poi| (poi.score() * SCORE_SCALE).round() as u64)
            .collect();
        let kinds = pois.iter().map(|poi| poi.kind()).collect();

        let pairs = slots
            .iter()
            .enumerate()
            .flat_map(|(position, slot)| {
                pois.iter().enumerate().filter_map(move |(p, poi)| {
                    poi.opening_window()
                        .is_none_or(|window| window.contains(slot.start, slot.end))
                        .then_some((position, p))
                })
            })
            .collect();

        Self {
            weights,
            kinds,
            slot_count: slots.len(),
            pairs,
            window: options.diversity_window,
            cap: options.diversity_cap,
            diversity_active: slots.len() >= options.diversity_window
                && options.diversity_cap < options.diversity_window,
        }
    }

    /// Objective coefficient of placing `poi` at `position`.
    ///
    /// Score dominates. Below one thousandth of score, a placement counts for
    /// more the earlier its slot, so equal-score optima resolve to the
    /// earliest slots and zero-score POIs still fill empty slots.
    fn coefficient(&self, position: usize, poi: usize) -> f64 {
        let slots = self.slot_count as u64;
        let scale = slots * (slots + 1) / 2 + 1;
        (self.weights[poi] * scale + (slots - position as u64)) as f64
    }

    /// Build and run the program, returning the selected (slot, POI) pairs
    /// and the number of constraints added.
    fn solve(&self, budget: Duration) -> Result<(Vec<(usize, usize)>, usize), AssignError> {
        let mut vars = variables!();
        let x: Vec<Variable> = self
            .pairs
            .iter()
            .map(|&(s, p)| vars.add(variable().binary().name(format!("x_{s}_{p}"))))
            .collect();

        let objective = self
            .pairs
            .iter()
            .zip(&x)
            .fold(Expression::from(0.0), |acc, (&(s, p), &var)| {
                acc + self.coefficient(s, p) * var
            });

        let mut prob = vars
            .maximise(objective)
            .using(highs)
            .set_option("mip_rel_gap", 0.0)
            .with_time_limit(budget.as_secs_f64());

        let mut constraints = 0;

        // At most one POI per slot.
        for position in 0..self.slot_count {
            constraints += bound_sum(&mut prob, self.members(&x, |s, _| s == position), 1);
        }
        // At most one slot per POI.
        for poi in 0..self.weights.len() {
            constraints += bound_sum(&mut prob, self.members(&x, |_, p| p == poi), 1);
        }
        // At most `cap` POIs of a kind in every window of consecutive slots.
        if self.diversity_active {
            let mut kinds: Vec<PoiKind> = Vec::new();
            for &kind in &self.kinds {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            for from in 0..=self.slot_count - self.window {
                let to = from + self.window;
                for &kind in &kinds {
                    let members = self.members(&x, |s, p| (from..to).contains(&s) && self.kinds[p] == kind);
                    constraints += bound_sum(&mut prob, members, self.cap);
                }
            }
        }

        tracing::debug!(variables = x.len(), constraints, "solving assignment program");

        let solution = match prob.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(AssignError::InfeasibleAssignment),
            Err(err) => return Err(AssignError::Solver(err.to_string())),
        };

        let picked = self
            .pairs
            .iter()
            .zip(&x)
            .filter(|&(_, &var)| solution.value(var) >= 0.5)
            .map(|(&pair, _)| pair)
            .collect();
        Ok((picked, constraints))
    }

    fn members(&self, x: &[Variable], keep: impl Fn(usize, usize) -> bool) -> Vec<Variable> {
        self.pairs
            .iter()
            .zip(x)
            .filter(|&(&(s, p), _)| keep(s, p))
            .map(|(_, &var)| var)
            .collect()
    }

    /// Lay `picked` out by slot if it satisfies capacity, opening hours and
    /// diversity.
    fn admit(&self, picked: &[(usize, usize)]) -> Option<Vec<Option<usize>>> {
        let mut chosen = vec![None; self.slot_count];
        let mut used = HashSet::new();
        for &(s, p) in picked {
            if !self.pairs.contains(&(s, p)) || chosen[s].is_some() || !used.insert(p) {
                return None;
            }
            chosen[s] = Some(p);
        }
        let diverse = !self.diversity_active
            || chosen.windows(self.window).all(|window| {
                window.iter().flatten().all(|&p| {
                    let same = window
                        .iter()
                        .flatten()
                        .filter(|&&other| self.kinds[other] == self.kinds[p])
                        .count();
                    same <= self.cap
                })
            });
        diverse.then_some(chosen)
    }
}

/// Add `sum(members) <= bound` unless it holds trivially. Returns the
/// number of constraints added.
fn bound_sum(prob: &mut impl SolverModel, members: Vec<Variable>, bound: usize) -> usize {
    if members.len() <= bound {
        return 0;
    }
    let sum = members.into_iter().fold(Expression::from(0.0), |acc, var| acc + var);
    prob.add_constraint(sum.leq(bound as f64));
    1
}

/// Turn a solver result into the assignment to report, or the error the
/// outcome calls for.
///
/// A solve that finished in time has proven its answer optimal, so an empty
/// answer means nothing can be placed. A solve cut short keeps a non-empty
/// feasible incumbent; anything else counts as no solution found.
fn settle(
    model: &Model,
    picked: &[(usize, usize)],
    outcome: Outcome,
    elapsed_ms: u64,
) -> Result<Vec<Option<usize>>, AssignError> {
    match (outcome, model.admit(picked)) {
        (Outcome::Finished, None) => Err(AssignError::Solver(
            "solver returned an assignment that breaks a constraint".to_string(),
        )),
        (Outcome::Finished, Some(_)) if picked.is_empty() => Err(AssignError::InfeasibleAssignment),
        (Outcome::Finished, Some(chosen)) => Ok(chosen),
        (Outcome::OutOfTime, Some(chosen)) if !picked.is_empty() => Ok(chosen),
        (Outcome::OutOfTime, _) => {
            tracing::warn!(elapsed_ms, "assignment budget exhausted without a feasible solution");
            Err(AssignError::BudgetExhaustedWithoutSolution { elapsed_ms })
        }
    }
}
