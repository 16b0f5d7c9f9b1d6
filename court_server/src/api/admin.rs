//! Admin API handlers.
//!
//! Every handler here passes the caller's [`Actor`] to a manager that checks
//! the matching capability, so a regular user gets `403 Forbidden`.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use court_booking::{
    analytics::{AnalyticsSummary, DEFAULT_ANALYTICS_DAYS, RevenueReport},
    auth::{Actor, PasswordReset, ResetId, User, UserId, UserUpdate},
    booking::Booking,
    catalog::Court,
    feedback::{Report, ReportId},
};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    errors::{ApiResult, access_error, auth_error, booking_error, feedback_error},
};

#[derive(Debug, Serialize)]
pub struct AcceptedReport {
    pub report: Report,
    pub court: Court,
}

pub async fn all_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = state
        .booking_manager
        .all_bookings(&actor)
        .await
        .map_err(booking_error)?;
    Ok(Json(bookings))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .auth_manager
        .list_users(&actor)
        .await
        .map_err(auth_error)?;
    Ok(Json(users))
}

/// Change a user's username, contact details, role or active flag
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    let user = state
        .auth_manager
        .update_user(&actor, &user_id, update)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}

/// Soft-delete a user; their bookings and ledger history stay intact
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<User>> {
    let user = state
        .auth_manager
        .deactivate_user(&actor, &user_id)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Report>>> {
    let reports = state
        .feedback_manager
        .list_reports(&actor)
        .await
        .map_err(feedback_error)?;
    Ok(Json(reports))
}

/// Accept a report; its court goes under repair
pub async fn accept_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(report_id): Path<ReportId>,
) -> ApiResult<Json<AcceptedReport>> {
    let (report, court) = state
        .feedback_manager
        .accept_report(&actor, report_id)
        .await
        .map_err(feedback_error)?;
    Ok(Json(AcceptedReport { report, court }))
}

/// Resolve a report; its court is available again
pub async fn resolve_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(report_id): Path<ReportId>,
) -> ApiResult<Json<Court>> {
    let court = state
        .feedback_manager
        .resolve_report(&actor, report_id)
        .await
        .map_err(feedback_error)?;
    Ok(Json(court))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

/// Dashboard figures with daily registration and booking counts.
///
/// # Query Parameters
///
/// - `days`: Length of the daily series (default 30, max 365)
pub async fn analytics(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let summary = state
        .analytics_manager
        .summary(&actor, query.days.unwrap_or(DEFAULT_ANALYTICS_DAYS))
        .await
        .map_err(access_error)?;
    Ok(Json(summary))
}

/// System balance with its payment and refund history
pub async fn revenue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<RevenueReport>> {
    let report = state
        .analytics_manager
        .revenue_report(&actor)
        .await
        .map_err(access_error)?;
    Ok(Json(report))
}

pub async fn list_password_resets(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<PasswordReset>>> {
    let resets = state
        .auth_manager
        .list_password_resets(&actor)
        .await
        .map_err(auth_error)?;
    Ok(Json(resets))
}

pub async fn approve_password_reset(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(reset_id): Path<ResetId>,
) -> ApiResult<Json<PasswordReset>> {
    let reset = state
        .auth_manager
        .approve_password_reset(&actor, reset_id)
        .await
        .map_err(auth_error)?;
    Ok(Json(reset))
}
