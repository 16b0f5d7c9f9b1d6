//! Court catalog API handlers.
//!
//! Browsing the catalog, free slots and reviews is public. Changing courts is
//! admin-only; filing condition reports and reviews needs a logged-in user.
//!
//! # Examples
//!
//! Search courts:
//! ```bash
//! curl "http://localhost:8080/api/v1/courts?text=clay&max_price_cents=5000"
//! ```
//!
//! Free slots of a court:
//! ```bash
//! curl http://localhost:8080/api/v1/courts/1/slots
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use court_booking::{
    auth::Actor,
    catalog::{Court, CourtId, CourtQuery, CourtStatus, CourtUpdate, NewCourt, TimeSlot},
    feedback::{NewReport, NewReview, RatingSummary, Report, Review},
};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    errors::{ApiResult, booking_error, catalog_error, feedback_error},
};

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub court_id: CourtId,
    /// Offered slots not held by an active booking
    pub available: Vec<TimeSlot>,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub rating: RatingSummary,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: CourtStatus,
}

/// List courts, optionally filtered.
///
/// # Query Parameters
///
/// - `text`: case-insensitive match against name or address
/// - `max_price_cents`: upper bound on the slot price
/// - `status`: `Available` or `Repairing`
pub async fn list_courts(
    State(state): State<AppState>,
    Query(query): Query<CourtQuery>,
) -> Json<Vec<Court>> {
    Json(state.catalog_manager.search_courts(&query).await)
}

pub async fn get_court(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> ApiResult<Json<Court>> {
    let court = state
        .catalog_manager
        .get_court(court_id)
        .await
        .map_err(catalog_error)?;
    Ok(Json(court))
}

/// Slots of a court that can still be booked
pub async fn available_slots(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> ApiResult<Json<SlotsResponse>> {
    let available = state
        .booking_manager
        .available_slots(court_id)
        .await
        .map_err(booking_error)?;
    Ok(Json(SlotsResponse {
        court_id,
        available,
    }))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> ApiResult<Json<ReviewsResponse>> {
    let reviews = state
        .feedback_manager
        .reviews_for(court_id)
        .await
        .map_err(feedback_error)?;
    let rating = state
        .feedback_manager
        .average_rating(court_id)
        .await
        .map_err(feedback_error)?;
    Ok(Json(ReviewsResponse { rating, reviews }))
}

/// Add a court (admin).
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Center Court",
///   "address": "1 Baseline Road",
///   "price_cents": 10000,
///   "capacity": 4,
///   "duration_hours": 5
/// }
/// ```
///
/// Slots are generated from `duration_hours` unless `play_times` is given.
pub async fn add_court(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(new): Json<NewCourt>,
) -> ApiResult<(StatusCode, Json<Court>)> {
    let court = state
        .catalog_manager
        .add_court(&actor, new)
        .await
        .map_err(catalog_error)?;
    Ok((StatusCode::CREATED, Json(court)))
}

pub async fn update_court(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(court_id): Path<CourtId>,
    Json(update): Json<CourtUpdate>,
) -> ApiResult<Json<Court>> {
    let court = state
        .catalog_manager
        .update_court(&actor, court_id, update)
        .await
        .map_err(catalog_error)?;
    Ok(Json(court))
}

/// Delete a court (admin).
///
/// # Errors
///
/// - `409 Conflict`: The court still has active bookings
pub async fn delete_court(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(court_id): Path<CourtId>,
) -> ApiResult<StatusCode> {
    state
        .catalog_manager
        .delete_court(&actor, court_id)
        .await
        .map_err(catalog_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(court_id): Path<CourtId>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult<Json<Court>> {
    let court = state
        .catalog_manager
        .set_status(&actor, court_id, payload.status)
        .await
        .map_err(catalog_error)?;
    Ok(Json(court))
}

/// File a condition report for a court
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(court_id): Path<CourtId>,
    Json(new): Json<NewReport>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = state
        .feedback_manager
        .submit_report(&actor, court_id, new)
        .await
        .map_err(feedback_error)?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Review a court the caller has booked.
///
/// # Errors
///
/// - `400 Bad Request`: Rating outside 1-5, comment too long, or court not open yet
/// - `403 Forbidden`: Caller holds no booking on the court
/// - `409 Conflict`: Caller already reviewed the court
pub async fn add_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(court_id): Path<CourtId>,
    Json(new): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = state
        .feedback_manager
        .add_review(&actor, court_id, new)
        .await
        .map_err(feedback_error)?;
    Ok((StatusCode::CREATED, Json(review)))
}
