//! Feedback error types.

use super::models::ReportId;
use crate::{auth::AccessError, catalog::CatalogError};
use thiserror::Error;

/// Feedback errors
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Report not found
    #[error("Report not found: {0}")]
    ReportNotFound(ReportId),

    /// Rating outside 1-5
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Comment too long
    #[error("Comment must be at most {max} characters")]
    CommentTooLong { max: usize },

    /// Reviewer holds no booking on the court
    #[error("Only players with a booking on this court can review it")]
    NoBooking,

    /// Court opens in the future
    #[error("Court cannot be reviewed before it opens")]
    CourtNotYetAvailable,

    /// Court opened today and the reviewer's slot has not ended yet
    #[error("Court can be reviewed after your booking ends at {ends_at}:00")]
    BookingNotFinished { ends_at: u8 },

    /// One review per court and user
    #[error("You have already reviewed this court")]
    AlreadyReviewed,

    /// Catalog failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Caller lacks the capability
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl FeedbackError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            FeedbackError::ReportNotFound(_) => "Report not found".to_string(),
            FeedbackError::Catalog(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for feedback operations
pub type FeedbackResult<T> = Result<T, FeedbackError>;
