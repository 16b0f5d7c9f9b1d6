//! Reports and reviews table.

use super::{
    errors::{FeedbackError, FeedbackResult},
    models::{RatingSummary, Report, ReportId, Review},
};
use crate::{auth::UserId, catalog::CourtId};
use std::collections::BTreeMap;

/// Condition reports and reviews, keyed per court
#[derive(Debug, Default)]
pub struct FeedbackBoard {
    reports: BTreeMap<ReportId, Report>,
    reviews: BTreeMap<(CourtId, UserId), Review>,
    last_report_id: ReportId,
}

impl FeedbackBoard {
    pub fn next_report_id(&mut self) -> ReportId {
        self.last_report_id += 1;
        self.last_report_id
    }

    pub fn add_report(&mut self, report: Report) -> &Report {
        self.reports.entry(report.id).or_insert(report)
    }

    pub fn report(&self, id: ReportId) -> FeedbackResult<&Report> {
        self.reports.get(&id).ok_or(FeedbackError::ReportNotFound(id))
    }

    pub fn report_mut(&mut self, id: ReportId) -> FeedbackResult<&mut Report> {
        self.reports
            .get_mut(&id)
            .ok_or(FeedbackError::ReportNotFound(id))
    }

    pub fn remove_report(&mut self, id: ReportId) -> FeedbackResult<Report> {
        self.reports
            .remove(&id)
            .ok_or(FeedbackError::ReportNotFound(id))
    }

    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.reports.values()
    }

    /// Store a review
    ///
    /// # Errors
    ///
    /// * `FeedbackError::AlreadyReviewed` - The user already reviewed the court
    pub fn add_review(&mut self, review: Review) -> FeedbackResult<&Review> {
        let key = (review.court_id, review.user_id.clone());
        if self.reviews.contains_key(&key) {
            return Err(FeedbackError::AlreadyReviewed);
        }
        Ok(self.reviews.entry(key).or_insert(review))
    }

    pub fn reviews_for(&self, court_id: CourtId) -> impl Iterator<Item = &Review> {
        self.reviews
            .range((court_id, UserId::new())..)
            .take_while(move |((court, _), _)| *court == court_id)
            .map(|(_, review)| review)
    }

    pub fn rating(&self, court_id: CourtId) -> RatingSummary {
        let (sum, count) = self
            .reviews_for(court_id)
            .fold((0u32, 0usize), |(sum, count), review| {
                (sum + u32::from(review.rating), count + 1)
            });
        let average = if count == 0 {
            0.0
        } else {
            (f64::from(sum) / count as f64 * 10.0).round() / 10.0
        };
        RatingSummary {
            court_id,
            average,
            count,
        }
    }

    /// Drop everything attached to a deleted court
    pub fn forget_court(&mut self, court_id: CourtId) {
        self.reports.retain(|_, report| report.court_id != court_id);
        self.reviews.retain(|(court, _), _| *court != court_id);
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }
}
