//! Feedback manager: condition reports drive court status, reviews rate courts.

use super::{
    errors::{FeedbackError, FeedbackResult},
    models::{NewReport, NewReview, RatingSummary, Report, ReportId, Review},
};
use crate::{
    auth::{AccessPolicy, Actor, Capability},
    catalog::{Court, CourtId, CourtStatus, TimeSlot},
    db::Database,
};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use log::info;

/// Longest accepted review comment, in characters
pub const MAX_COMMENT_CHARS: usize = 150;

/// Feedback manager
#[derive(Clone)]
pub struct FeedbackManager {
    db: Database,
}

impl FeedbackManager {
    /// Create a new feedback manager
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// File a condition report for a court
    pub async fn submit_report(
        &self,
        actor: &Actor,
        court_id: CourtId,
        new: NewReport,
    ) -> FeedbackResult<Report> {
        let mut tables = self.db.write().await;
        tables.catalog.get(court_id)?;

        let id = tables.feedback.next_report_id();
        let report = tables
            .feedback
            .add_report(Report {
                id,
                court_id,
                reporter_id: actor.user_id.clone(),
                condition: new.condition,
                balls: new.balls,
                court_quality: new.court_quality,
                additional_info: new.additional_info,
                accepted: false,
                created_at: Utc::now(),
            })
            .clone();

        info!(
            "Report {id} on court {court_id} filed by {}: {:?}",
            actor.user_id, report.condition
        );
        Ok(report)
    }

    pub async fn list_reports(&self, actor: &Actor) -> FeedbackResult<Vec<Report>> {
        AccessPolicy::require(actor, Capability::ModerateReports)?;
        let tables = self.db.read().await;
        Ok(tables.feedback.reports().cloned().collect())
    }

    /// Accept a report and put its court under repair
    ///
    /// # Errors
    ///
    /// * `FeedbackError::Access` - Actor cannot moderate reports
    /// * `FeedbackError::ReportNotFound` - No such report
    pub async fn accept_report(
        &self,
        actor: &Actor,
        report_id: ReportId,
    ) -> FeedbackResult<(Report, Court)> {
        AccessPolicy::require(actor, Capability::ModerateReports)?;

        let mut tables = self.db.write().await;
        let court_id = tables.feedback.report(report_id)?.court_id;
        let court = tables
            .catalog
            .set_status(court_id, CourtStatus::Repairing)?
            .clone();
        let report = tables.feedback.report_mut(report_id)?;
        report.accepted = true;

        info!("Report {report_id} accepted, court {court_id} under repair");
        Ok((report.clone(), court))
    }

    /// Close a report: the court is available again and the report is removed
    pub async fn resolve_report(
        &self,
        actor: &Actor,
        report_id: ReportId,
    ) -> FeedbackResult<Court> {
        AccessPolicy::require(actor, Capability::ModerateReports)?;

        let mut tables = self.db.write().await;
        let court_id = tables.feedback.report(report_id)?.court_id;
        let court = tables
            .catalog
            .set_status(court_id, CourtStatus::Available)?
            .clone();
        tables.feedback.remove_report(report_id)?;

        info!("Report {report_id} resolved, court {court_id} available");
        Ok(court)
    }

    /// Review a court the actor has booked
    ///
    /// # Errors
    ///
    /// * `FeedbackError::InvalidRating` - Rating outside 1-5
    /// * `FeedbackError::CommentTooLong` - Comment over the limit
    /// * `FeedbackError::NoBooking` - Actor holds no booking on the court
    /// * `FeedbackError::CourtNotYetAvailable` - Court opens in the future
    /// * `FeedbackError::BookingNotFinished` - Court opened today and the
    ///   actor's first booking on it has not ended
    /// * `FeedbackError::AlreadyReviewed` - Actor already reviewed the court
    pub async fn add_review(
        &self,
        actor: &Actor,
        court_id: CourtId,
        new: NewReview,
    ) -> FeedbackResult<Review> {
        if !(1..=5).contains(&new.rating) {
            return Err(FeedbackError::InvalidRating(new.rating));
        }
        let comment = new
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(FeedbackError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
            });
        }

        let now = Utc::now();
        let mut tables = self.db.write().await;
        let court = tables.catalog.get(court_id)?;
        if court
            .available_date
            .is_some_and(|date| date > now.date_naive())
        {
            return Err(FeedbackError::CourtNotYetAvailable);
        }
        let booking = tables
            .bookings
            .first_booking_on(&actor.user_id, court_id)
            .ok_or(FeedbackError::NoBooking)?;
        ensure_play_finished(court.available_date, now, &booking.slot)?;

        let review = tables
            .feedback
            .add_review(Review {
                court_id,
                user_id: actor.user_id.clone(),
                rating: new.rating,
                comment,
                created_at: now,
            })?
            .clone();

        info!(
            "Court {court_id} rated {} by {}",
            review.rating, actor.user_id
        );
        Ok(review)
    }

    pub async fn reviews_for(&self, court_id: CourtId) -> FeedbackResult<Vec<Review>> {
        let tables = self.db.read().await;
        tables.catalog.get(court_id)?;
        Ok(tables.feedback.reviews_for(court_id).cloned().collect())
    }

    pub async fn average_rating(&self, court_id: CourtId) -> FeedbackResult<RatingSummary> {
        let tables = self.db.read().await;
        tables.catalog.get(court_id)?;
        Ok(tables.feedback.rating(court_id))
    }
}

/// On a court's opening day a review waits until the booked slot is over
fn ensure_play_finished(
    opens_on: Option<NaiveDate>,
    now: DateTime<Utc>,
    slot: &TimeSlot,
) -> FeedbackResult<()> {
    let ends_at = slot.end_hour();
    if opens_on == Some(now.date_naive()) && now.hour() < u32::from(ends_at) {
        return Err(FeedbackError::BookingNotFinished { ends_at });
    }
    Ok(())
}
