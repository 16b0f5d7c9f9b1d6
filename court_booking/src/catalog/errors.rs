//! Catalog error types.

use super::{models::CourtId, slots::SlotParseError};
use crate::auth::AccessError;
use thiserror::Error;

/// Court catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Court not found
    #[error("Court not found: {0}")]
    CourtNotFound(CourtId),

    /// Price must be non-negative
    #[error("Invalid price: {0}")]
    InvalidPrice(i64),

    /// Capacity must be at least one player
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(u32),

    /// Duration yields no slot inside the operating window
    #[error("Invalid slot duration: {0} hours")]
    InvalidDuration(i32),

    /// Explicit slot list is empty or repeats a slot
    #[error("Invalid play times: {0}")]
    InvalidPlayTimes(String),

    /// Slot label could not be parsed
    #[error(transparent)]
    Slot(#[from] SlotParseError),

    /// Available date lies before today
    #[error("Available date must be today or in the future")]
    DateInPast,

    /// Name must not be blank
    #[error("Court name must not be empty")]
    MissingName,

    /// Court still has active bookings
    #[error("Court {0} still has active bookings")]
    CourtInUse(CourtId),

    /// Caller lacks the capability
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl CatalogError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            CatalogError::CourtNotFound(_) => "Court not found".to_string(),
            CatalogError::CourtInUse(_) => "Court still has active bookings".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
