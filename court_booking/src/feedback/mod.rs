//! Court condition reports and star reviews.
//!
//! Accepting a report puts its court under repair, which blocks new bookings;
//! resolving it makes the court available again. Reviews are limited to players
//! holding a booking on the court.

pub mod board;
pub mod errors;
pub mod manager;
pub mod models;

pub use board::FeedbackBoard;
pub use errors::{FeedbackError, FeedbackResult};
pub use manager::{FeedbackManager, MAX_COMMENT_CHARS};
pub use models::{
    CourtCondition, NewReport, NewReview, RatingSummary, Report, ReportId, Review,
};
