//! Court data models.

use super::slots::TimeSlot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Court ID type
pub type CourtId = i64;

/// Court status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourtStatus {
    Available,
    Repairing,
}

impl std::fmt::Display for CourtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourtStatus::Available => write!(f, "Available"),
            CourtStatus::Repairing => write!(f, "Repairing"),
        }
    }
}

/// Court model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    pub address: Option<String>,
    /// Price per slot in cents
    pub price_cents: i64,
    pub area_sq_m: f64,
    /// Maximum number of players
    pub capacity: u32,
    pub duration_hours: i32,
    pub status: CourtStatus,
    /// Slots offered for booking
    pub play_times: Vec<TimeSlot>,
    pub available_date: Option<NaiveDate>,
    pub brief: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Court {
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }

    pub fn offers(&self, slot: &TimeSlot) -> bool {
        self.play_times.contains(slot)
    }
}

/// New court request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourt {
    pub name: String,
    pub address: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub area_sq_m: f64,
    pub capacity: u32,
    pub duration_hours: i32,
    /// Explicit slot list; generated from the duration when absent
    #[serde(default)]
    pub play_times: Option<Vec<TimeSlot>>,
    #[serde(default)]
    pub available_date: Option<NaiveDate>,
    #[serde(default)]
    pub brief: Option<String>,
}

/// Partial court update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub price_cents: Option<i64>,
    pub area_sq_m: Option<f64>,
    pub capacity: Option<u32>,
    pub duration_hours: Option<i32>,
    pub play_times: Option<Vec<TimeSlot>>,
    pub available_date: Option<NaiveDate>,
    pub brief: Option<String>,
}

/// Court search filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtQuery {
    /// Case-insensitive match against name or address
    pub text: Option<String>,
    pub max_price_cents: Option<i64>,
    pub status: Option<CourtStatus>,
}
