//! Report and review models.

use crate::{auth::UserId, catalog::CourtId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report ID type
pub type ReportId = i64;

/// Condition observed by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtCondition {
    Good,
    Damaged,
    NeedsRepair,
}

/// Court condition report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub court_id: CourtId,
    pub reporter_id: UserId,
    pub condition: CourtCondition,
    pub balls: u32,
    pub court_quality: String,
    pub additional_info: Option<String>,
    /// Set once an admin has put the court under repair
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// Report submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    pub condition: CourtCondition,
    #[serde(default)]
    pub balls: u32,
    #[serde(default)]
    pub court_quality: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Star review, one per court and user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub court_id: CourtId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Mean rating of a court
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub court_id: CourtId,
    /// Rounded to one decimal; 0 without reviews
    pub average: f64,
    pub count: usize,
}
