//! Point-of-interest records as produced by the upstream scorer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::traits::PointOfInterest;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Category of a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoiKind {
    Museum,
    Church,
    Park,
    HistoricBuilding,
    Monument,
    Gallery,
    Theatre,
    ArchaeologicalSite,
    Bridge,
}

impl PoiKind {
    pub const ALL: [PoiKind; 9] = [
        PoiKind::Museum,
        PoiKind::Church,
        PoiKind::Park,
        PoiKind::HistoricBuilding,
        PoiKind::Monument,
        PoiKind::Gallery,
        PoiKind::Theatre,
        PoiKind::ArchaeologicalSite,
        PoiKind::Bridge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PoiKind::Museum => "Museum",
            PoiKind::Church => "Church",
            PoiKind::Park => "Park",
            PoiKind::HistoricBuilding => "HistoricBuilding",
            PoiKind::Monument => "Monument",
            PoiKind::Gallery => "Gallery",
            PoiKind::Theatre => "Theatre",
            PoiKind::ArchaeologicalSite => "ArchaeologicalSite",
            PoiKind::Bridge => "Bridge",
        }
    }
}

impl fmt::Display for PoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoiKind {
    type Err = InputError;

    /// Accepts bare names as well as `dbo:` and full ontology URIs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .trim()
            .trim_start_matches("http://dbpedia.org/ontology/")
            .trim_start_matches("dbo:");
        PoiKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| InputError::UnknownKind(s.to_string()))
    }
}

impl TryFrom<String> for PoiKind {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PoiKind> for String {
    fn from(kind: PoiKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Opening hours in whole hours.
///
/// A window with `close < open` is open overnight: `[open, 24) ∪ [0, close)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningWindow {
    open: u8,
    close: u8,
}

impl OpeningWindow {
    /// Build a window from whole hours. Equal bounds mean open all day.
    pub fn hours(open: u8, close: u8) -> Result<Self, InputError> {
        if open > 24 || close > 24 {
            return Err(InputError::InvalidTime(format!("{open:02}:00-{close:02}:00")));
        }
        if open == close {
            return Ok(Self { open: 0, close: 24 });
        }
        Ok(Self { open, close })
    }

    /// Parse `HH:MM` bounds. Both absent means always open, one absent
    /// defaults to the start or end of the day.
    ///
    /// Minutes are rounded inwards: the opening hour rounds up and the
    /// closing hour rounds down, so the window never claims time the POI is
    /// closed.
    pub fn parse(open: Option<&str>, close: Option<&str>) -> Result<Option<Self>, InputError> {
        if open.is_none() && close.is_none() {
            return Ok(None);
        }
        let open_min = open.map(parse_clock).transpose()?.unwrap_or(0);
        let close_min = close.map(parse_clock).transpose()?.unwrap_or(MINUTES_PER_DAY);

        if open_min == close_min || (open_min == 0 && close_min == MINUTES_PER_DAY) {
            return Ok(Some(Self { open: 0, close: 24 }));
        }

        let open_h = open_min.div_ceil(60) as u8;
        let close_h = (close_min / 60) as u8;

        if close_min < open_min {
            return Ok(Some(Self { open: open_h, close: close_h }));
        }
        // Rounding may collapse a short window to nothing.
        if open_h >= close_h {
            return Ok(Some(Self { open: 0, close: 0 }));
        }
        Ok(Some(Self { open: open_h, close: close_h }))
    }

    pub fn open(&self) -> u8 {
        self.open
    }

    pub fn close(&self) -> u8 {
        self.close
    }

    pub fn is_overnight(&self) -> bool {
        self.close < self.open
    }

    /// Whether `[start, end)` lies entirely inside the window.
    pub fn contains(&self, start: u8, end: u8) -> bool {
        if self.is_overnight() {
            self.open <= start || end <= self.close
        } else {
            self.open <= start && end <= self.close
        }
    }
}

/// Parse `HH:MM` (or `H.MM`) into minutes after midnight. `24:00` is allowed.
pub fn parse_clock(text: &str) -> Result<u16, InputError> {
    let invalid = || InputError::InvalidTime(text.to_string());
    let trimmed = text.trim();
    let (hours, minutes) = trimmed
        .split_once(':')
        .or_else(|| trimmed.split_once('.'))
        .ok_or_else(invalid)?;
    let hours: u16 = hours.parse().map_err(|_| invalid())?;
    let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// A scored point of interest record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPoiRecord")]
pub struct PoiRecord {
    pub id: String,
    pub label: String,
    pub kind: PoiKind,
    pub score: f64,
    pub window: Option<OpeningWindow>,
    pub cluster: Option<i64>,
    pub location: Option<(f64, f64)>,
}

impl PoiRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: PoiKind, score: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            score,
            window: None,
            cluster: None,
            location: None,
        }
    }

    pub fn with_window(mut self, window: OpeningWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_hours(mut self, open: &str, close: &str) -> Result<Self, InputError> {
        self.window = OpeningWindow::parse(Some(open), Some(close))?;
        Ok(self)
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some((lat, lng));
        self
    }

    pub fn in_cluster(mut self, cluster: i64) -> Self {
        self.cluster = Some(cluster);
        self
    }
}

impl PointOfInterest for PoiRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> PoiKind {
        self.kind
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn opening_window(&self) -> Option<OpeningWindow> {
        self.window
    }

    fn location(&self) -> Option<(f64, f64)> {
        self.location
    }
}

#[derive(Debug, Deserialize)]
struct RawPoiRecord {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type")]
    kind: PoiKind,
    score: f64,
    open: Option<String>,
    close: Option<String>,
    cluster: Option<i64>,
    lat: Option<f64>,
    lng: Option<f64>,
}

impl TryFrom<RawPoiRecord> for PoiRecord {
    type Error = InputError;

    fn try_from(raw: RawPoiRecord) -> Result<Self, Self::Error> {
        validate_score(&raw.id, raw.score)?;
        let window = OpeningWindow::parse(raw.open.as_deref(), raw.close.as_deref())?;
        let location = raw.lat.zip(raw.lng);
        Ok(Self {
            id: raw.id,
            label: raw.label,
            kind: raw.kind,
            score: raw.score,
            window,
            cluster: raw.cluster,
            location,
        })
    }
}

pub(crate) fn validate_score(id: &str, score: f64) -> Result<(), InputError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(InputError::InvalidScore {
            id: id.to_string(),
            score: score.to_string(),
        })
    }
}
