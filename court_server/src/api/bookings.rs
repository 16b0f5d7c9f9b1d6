//! Booking API handlers.
//!
//! All endpoints act on behalf of the authenticated user. Payment happens as
//! part of booking; cancelling refunds the invoice back to the payer's wallet.
//!
//! # Examples
//!
//! Book a slot paid from the wallet:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/bookings \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"court_id": 1, "slot": "8 hours -13 hours", "payment": {"method": "balance"}}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use court_booking::{
    auth::Actor,
    booking::{Booking, BookingId, BookingReceipt, BookingRequest, CancellationReceipt},
    catalog::TimeSlot,
};
use serde::Deserialize;

use super::{
    AppState,
    errors::{ApiResult, booking_error},
    request_id::RequestId,
};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct ReschedulePayload {
    pub slot: TimeSlot,
}

/// Caller's active bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Json<Vec<Booking>> {
    Json(state.booking_manager.bookings_for(&actor.user_id).await)
}

/// Book and pay for a slot.
///
/// # Response
///
/// `201 Created` with the booking, its Paid invoice, the caller's wallet
/// balance and the system balance.
///
/// # Errors
///
/// - `400 Bad Request`: Court does not offer the slot
/// - `402 Payment Required`: Insufficient wallet balance or declined card
/// - `404 Not Found`: Court does not exist
/// - `409 Conflict`: Slot already booked or court under repair
pub async fn book(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingReceipt>)> {
    let receipt = state
        .booking_manager
        .book(&actor, request)
        .await
        .map_err(booking_error)?;

    tracing::info!(
        request_id = request_id.as_str(),
        booking_id = receipt.booking.id,
        invoice_id = receipt.invoice.id,
        "Booking confirmed"
    );
    metrics::bookings_created_total(receipt.booking.court_id);
    metrics::payments_total(
        &receipt.invoice.payment_method.to_string(),
        receipt.invoice.amount,
    );
    metrics::system_balance_cents(receipt.system_balance);

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Cancel a booking and refund its invoice.
///
/// Admins may cancel any booking; users only their own.
pub async fn cancel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Extension(request_id): Extension<RequestId>,
    Path(booking_id): Path<BookingId>,
) -> ApiResult<Json<CancellationReceipt>> {
    let receipt = state
        .booking_manager
        .cancel(&actor, booking_id)
        .await
        .map_err(booking_error)?;

    tracing::info!(
        request_id = request_id.as_str(),
        booking_id = booking_id,
        "Booking cancelled"
    );
    metrics::bookings_cancelled_total();
    metrics::refunds_total(receipt.invoice.amount);
    metrics::system_balance_cents(receipt.system_balance);

    Ok(Json(receipt))
}

/// Move a booking to another slot of the same court
pub async fn reschedule(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<BookingId>,
    Json(payload): Json<ReschedulePayload>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .booking_manager
        .reschedule(&actor, booking_id, payload.slot)
        .await
        .map_err(booking_error)?;
    metrics::bookings_rescheduled_total();
    Ok(Json(booking))
}
