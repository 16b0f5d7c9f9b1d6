//! Play-time slots inside a court's operating window.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// First hour of play
pub const OPENING_HOUR: u8 = 8;

/// Hour at which the last slot must have ended
pub const CLOSING_HOUR: u8 = 22;

/// Slot label errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotParseError {
    /// Label does not read `"<start> hours - <end> hours"`
    #[error("Malformed slot label: {0}")]
    Malformed(String),

    /// Interval is empty or leaves the operating window
    #[error("Slot {start}-{end} is outside the operating window")]
    OutOfWindow { start: u8, end: u8 },
}

/// A fixed interval `[start_hour, end_hour)` within the operating window.
///
/// Slots order by start hour, then end hour. Their string form is only used
/// for display and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    start_hour: u8,
    end_hour: u8,
}

impl TimeSlot {
    /// Create a slot, checking it lies within `[OPENING_HOUR, CLOSING_HOUR]`.
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, SlotParseError> {
        if start_hour < OPENING_HOUR || end_hour > CLOSING_HOUR || end_hour <= start_hour {
            return Err(SlotParseError::OutOfWindow {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.end_hour
    }

    pub fn duration_hours(&self) -> u8 {
        self.end_hour - self.start_hour
    }

    /// Whether the two intervals share any hour
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_hour < other.end_hour && other.start_hour < self.end_hour
    }
}

/// Partition the operating window into contiguous `duration_hours` blocks.
///
/// Blocks start at [`OPENING_HOUR`] and step by the duration; a block that
/// would end after [`CLOSING_HOUR`] is dropped. Non-positive durations yield
/// no slots.
pub fn generate_slots(duration_hours: i32) -> Vec<TimeSlot> {
    if duration_hours <= 0 {
        return Vec::new();
    }

    let step = duration_hours as usize;
    (OPENING_HOUR..CLOSING_HOUR)
        .step_by(step)
        .filter_map(|start| {
            let end = i64::from(start) + i64::from(duration_hours);
            (end <= i64::from(CLOSING_HOUR)).then(|| TimeSlot {
                start_hour: start,
                end_hour: end as u8,
            })
        })
        .collect()
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Single-digit starts have historically been rendered without the space.
        if self.start_hour < 10 {
            write!(f, "{} hours -{} hours", self.start_hour, self.end_hour)
        } else {
            write!(f, "{} hours - {} hours", self.start_hour, self.end_hour)
        }
    }
}

impl FromStr for TimeSlot {
    type Err = SlotParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let malformed = || SlotParseError::Malformed(label.to_string());

        let (start, end) = label.split_once('-').ok_or_else(malformed)?;
        let start = parse_hour(start).ok_or_else(malformed)?;
        let end = parse_hour(end).ok_or_else(malformed)?;

        TimeSlot::new(start, end)
    }
}

fn parse_hour(part: &str) -> Option<u8> {
    part.trim().strip_suffix("hours")?.trim().parse().ok()
}

impl TryFrom<String> for TimeSlot {
    type Error = SlotParseError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}
