//! Hourly slot calendar for a single visiting day.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::InputError;

/// A one-hour slot of the daily calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    pub index: usize,
    pub start: u8,
    pub end: u8,
}

impl TimeSlot {
    /// Label in `HH:00–HH:00` form.
    pub fn label(&self) -> String {
        format!("{:02}:00–{:02}:00", self.start, self.end)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Contiguous day window split into hourly slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotCalendar {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for SlotCalendar {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl SlotCalendar {
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, InputError> {
        let calendar = Self {
            start_hour,
            end_hour,
        };
        calendar.validate()?;
        Ok(calendar)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.end_hour > 24 || self.start_hour > self.end_hour {
            return Err(InputError::InvalidCalendar {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        if self.start_hour == self.end_hour {
            return Err(InputError::EmptyCalendar);
        }
        Ok(())
    }

    /// The ordered one-hour slots of the calendar.
    pub fn slots(&self) -> Result<Vec<TimeSlot>, InputError> {
        self.validate()?;
        Ok((self.start_hour..self.end_hour)
            .enumerate()
            .map(|(index, start)| TimeSlot {
                index,
                start,
                end: start + 1,
            })
            .collect())
    }
}
