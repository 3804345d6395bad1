//! Post-solve checks over a finished itinerary.
//!
//! Each rule is a linear scan over the ordered stops. Findings are returned
//! as structured [`Warning`]s; nothing is printed and the itinerary is never
//! modified.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::planner::ItineraryStop;
use crate::poi::PoiKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Consecutive stops of one type that trigger [`Warning::SameKindRun`].
    pub run_length: usize,
    /// Legs longer than this many seconds trigger [`Warning::LongTransit`].
    pub long_transit_secs: u64,
    /// Types that should not be visited late in the day.
    pub late_sensitive_kinds: Vec<PoiKind>,
    /// Slots starting at or after this hour count as late.
    pub late_after_hour: u8,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            run_length: 3,
            long_transit_secs: 30 * 60,
            late_sensitive_kinds: vec![PoiKind::ArchaeologicalSite],
            late_after_hour: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// `run_length` consecutive stops share a type, starting at `start`.
    SameKindRun { kind: PoiKind, start: usize },
    /// The leg from stop `from` to the next one is too long.
    LongTransit {
        from: usize,
        from_id: String,
        to_id: String,
        seconds: u64,
    },
    LateVisit { poi_id: String, kind: PoiKind, hour: u8 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SameKindRun { kind, start } => {
                write!(f, "consecutive {kind} stops starting at stop {start}")
            }
            Warning::LongTransit {
                from_id,
                to_id,
                seconds,
                ..
            } => write!(
                f,
                "walk from {from_id} to {to_id} takes {:.1} min",
                *seconds as f64 / 60.0
            ),
            Warning::LateVisit { poi_id, kind, hour } => {
                write!(f, "{kind} {poi_id} visited late ({hour:02}:00)")
            }
        }
    }
}

/// Run every rule over `stops` in route order.
pub fn check_itinerary(stops: &[ItineraryStop], config: &DiagnosticsConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if config.run_length > 0 {
        for (start, run) in stops.windows(config.run_length).enumerate() {
            let kind = run[0].kind;
            if run.iter().all(|stop| stop.kind == kind) {
                warnings.push(Warning::SameKindRun { kind, start });
            }
        }
    }

    for (from, leg) in stops.windows(2).enumerate() {
        let seconds = leg[1]
            .cumulative_cost_seconds
            .saturating_sub(leg[0].cumulative_cost_seconds);
        if seconds > config.long_transit_secs {
            warnings.push(Warning::LongTransit {
                from,
                from_id: leg[0].poi_id.clone(),
                to_id: leg[1].poi_id.clone(),
                seconds,
            });
        }
    }

    for stop in stops {
        let slot = stop.slot;
        if slot.start >= config.late_after_hour && config.late_sensitive_kinds.contains(&stop.kind) {
            warnings.push(Warning::LateVisit {
                poi_id: stop.poi_id.clone(),
                kind: stop.kind,
                hour: slot.start,
            });
        }
    }

    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "itinerary diagnostics raised warnings");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::TimeSlot;

    fn stop(id: &str, kind: PoiKind, cumulative: u64, hour: u8) -> ItineraryStop {
        ItineraryStop {
            poi_id: id.to_string(),
            label: id.to_string(),
            kind,
            score: 0.5,
            cumulative_cost_seconds: cumulative,
            slot: TimeSlot {
                index: usize::from(hour - 9),
                start: hour,
                end: hour + 1,
            },
            cluster: None,
        }
    }

    #[test]
    fn flags_runs_of_one_type() {
        let stops = vec![
            stop("a", PoiKind::Church, 0, 9),
            stop("b", PoiKind::Church, 100, 10),
            stop("c", PoiKind::Church, 200, 11),
            stop("d", PoiKind::Church, 300, 12),
            stop("e", PoiKind::Park, 400, 13),
        ];
        let warnings = check_itinerary(&stops, &DiagnosticsConfig::default());
        assert_eq!(
            warnings,
            vec![
                Warning::SameKindRun { kind: PoiKind::Church, start: 0 },
                Warning::SameKindRun { kind: PoiKind::Church, start: 1 },
            ]
        );
    }

    #[test]
    fn flags_long_legs() {
        let stops = vec![
            stop("a", PoiKind::Museum, 0, 9),
            stop("b", PoiKind::Park, 1800, 10),
            stop("c", PoiKind::Bridge, 3700, 11),
        ];
        let warnings = check_itinerary(&stops, &DiagnosticsConfig::default());
        assert_eq!(
            warnings,
            vec![Warning::LongTransit {
                from: 1,
                from_id: "b".to_string(),
                to_id: "c".to_string(),
                seconds: 1900,
            }]
        );
        assert_eq!(warnings[0].to_string(), "walk from b to c takes 31.7 min");
    }

    #[test]
    fn flags_late_archaeological_sites() {
        let stops = vec![
            stop("forum", PoiKind::ArchaeologicalSite, 0, 15),
            stop("ostia", PoiKind::ArchaeologicalSite, 600, 16),
            stop("gallery", PoiKind::Gallery, 900, 17),
        ];
        let warnings = check_itinerary(&stops, &DiagnosticsConfig::default());
        assert_eq!(
            warnings,
            vec![Warning::LateVisit {
                poi_id: "ostia".to_string(),
                kind: PoiKind::ArchaeologicalSite,
                hour: 16,
            }]
        );
    }

    #[test]
    fn quiet_on_a_clean_day() {
        let stops = vec![
            stop("a", PoiKind::Museum, 0, 9),
            stop("b", PoiKind::Park, 600, 10),
            stop("c", PoiKind::Museum, 1200, 11),
        ];
        assert!(check_itinerary(&stops, &DiagnosticsConfig::default()).is_empty());
    }
}
