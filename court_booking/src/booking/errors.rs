//! Booking error types.

use super::models::BookingId;
use crate::{
    auth::{AccessError, UserId},
    catalog::{CatalogError, CourtId, TimeSlot},
    wallet::WalletError,
};
use thiserror::Error;

/// Booking errors
#[derive(Debug, Error)]
pub enum BookingError {
    /// Slot is taken or the court is under repair
    #[error("Slot {slot} on court {court_id} is unavailable")]
    SlotUnavailable { court_id: CourtId, slot: TimeSlot },

    /// Slot is not on the court's list
    #[error("Court {court_id} does not offer slot {slot}")]
    InvalidSlot { court_id: CourtId, slot: TimeSlot },

    /// Booking not found
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Deactivated accounts cannot book
    #[error("User account is inactive")]
    UserInactive,

    /// Catalog failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Payment failure
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Caller lacks the capability
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl BookingError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            BookingError::BookingNotFound(_) => "Booking not found".to_string(),
            BookingError::UserNotFound(_) => "User not found".to_string(),
            BookingError::Catalog(e) => e.client_message(),
            BookingError::Wallet(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for booking operations
pub type BookingResult<T> = Result<T, BookingError>;
