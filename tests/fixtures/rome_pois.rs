//! Real central Rome sights for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Scores are made up but stable;
//! opening hours follow the sites' usual summer schedules.

use itinerary_planner::poi::{PoiKind, PoiRecord};

/// A named sight with coordinates and visiting data.
#[derive(Debug, Clone)]
pub struct Sight {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: PoiKind,
    pub score: f64,
    pub hours: Option<(&'static str, &'static str)>,
    pub lat: f64,
    pub lng: f64,
}

impl Sight {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        kind: PoiKind,
        score: f64,
        hours: Option<(&'static str, &'static str)>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            score,
            hours,
            lat,
            lng,
        }
    }

    pub fn record(&self) -> PoiRecord {
        let record = PoiRecord::new(self.id, self.name, self.kind, self.score).at(self.lat, self.lng);
        match self.hours {
            Some((open, close)) => record.with_hours(open, close).expect("fixture hours are valid"),
            None => record,
        }
    }
}

// ============================================================================
// Ancient Rome
// ============================================================================

pub const ANCIENT: &[Sight] = &[
    Sight::new("colosseum", "Colosseum", PoiKind::ArchaeologicalSite, 0.98, Some(("08:30", "19:15")), 41.8902, 12.4922),
    Sight::new("forum", "Roman Forum", PoiKind::ArchaeologicalSite, 0.93, Some(("09:00", "19:00")), 41.8925, 12.4853),
    Sight::new("palatine", "Palatine Hill", PoiKind::ArchaeologicalSite, 0.85, Some(("09:00", "19:00")), 41.8894, 12.4875),
    Sight::new("circus_maximus", "Circus Maximus", PoiKind::ArchaeologicalSite, 0.55, None, 41.8861, 12.4853),
    Sight::new("pantheon", "Pantheon", PoiKind::Church, 0.95, Some(("09:00", "19:00")), 41.8986, 12.4769),
];

// ============================================================================
// Churches
// ============================================================================

pub const CHURCHES: &[Sight] = &[
    Sight::new("st_peters", "St. Peter's Basilica", PoiKind::Church, 0.97, Some(("07:00", "19:00")), 41.9022, 12.4539),
    Sight::new("santa_maria_maggiore", "Santa Maria Maggiore", PoiKind::Church, 0.78, Some(("07:00", "18:45")), 41.8976, 12.4984),
    Sight::new("san_clemente", "Basilica of San Clemente", PoiKind::Church, 0.62, Some(("10:00", "17:30")), 41.8894, 12.4977),
    Sight::new("sant_ignazio", "Sant'Ignazio di Loyola", PoiKind::Church, 0.58, Some(("09:00", "23:00")), 41.8991, 12.4799),
];

// ============================================================================
// Museums and galleries
// ============================================================================

pub const MUSEUMS: &[Sight] = &[
    Sight::new("vatican_museums", "Vatican Museums", PoiKind::Museum, 0.96, Some(("08:00", "18:00")), 41.9065, 12.4536),
    Sight::new("capitoline", "Capitoline Museums", PoiKind::Museum, 0.82, Some(("09:30", "19:30")), 41.8930, 12.4828),
    Sight::new("borghese", "Galleria Borghese", PoiKind::Gallery, 0.88, Some(("09:00", "19:00")), 41.9142, 12.4921),
    Sight::new("doria_pamphilj", "Galleria Doria Pamphilj", PoiKind::Gallery, 0.64, Some(("10:00", "18:00")), 41.8978, 12.4814),
];

// ============================================================================
// Open-air sights
// ============================================================================

pub const OUTDOORS: &[Sight] = &[
    Sight::new("trevi", "Trevi Fountain", PoiKind::Monument, 0.91, None, 41.9009, 12.4833),
    Sight::new("spanish_steps", "Spanish Steps", PoiKind::Monument, 0.80, None, 41.9060, 12.4828),
    Sight::new("navona", "Piazza Navona", PoiKind::Monument, 0.76, None, 41.8992, 12.4731),
    Sight::new("villa_borghese", "Villa Borghese Gardens", PoiKind::Park, 0.66, None, 41.9128, 12.4852),
    Sight::new("sant_angelo_bridge", "Ponte Sant'Angelo", PoiKind::Bridge, 0.52, None, 41.9014, 12.4663),
    Sight::new("castel_sant_angelo", "Castel Sant'Angelo", PoiKind::HistoricBuilding, 0.74, Some(("09:00", "19:30")), 41.9031, 12.4663),
];

/// Every fixture sight as a record.
pub fn all_sights() -> Vec<PoiRecord> {
    ANCIENT
        .iter()
        .chain(CHURCHES)
        .chain(MUSEUMS)
        .chain(OUTDOORS)
        .map(Sight::record)
        .collect()
}
