//! Mapping from library errors to HTTP responses.
//!
//! Every handler fails with an [`ApiError`]: a status code and a JSON body of
//! the form `{"error": "..."}`. Messages come from each error's
//! `client_message()`, which keeps internal identifiers out of responses.

use axum::{Json, http::StatusCode};
use court_booking::{
    auth::{AccessError, AuthError},
    booking::BookingError,
    catalog::CatalogError,
    feedback::FeedbackError,
    wallet::WalletError,
};
use serde::{Deserialize, Serialize};

use crate::logging::log_security_event;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn access_error(err: AccessError) -> ApiError {
    log_security_event("forbidden", None, &err.to_string());
    error_response(StatusCode::FORBIDDEN, err.to_string())
}

pub fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::Access(e) => return access_error(e.clone()),
        AuthError::InvalidCredentials | AuthError::JwtError(_) => StatusCode::UNAUTHORIZED,
        AuthError::UserInactive | AuthError::CannotDeactivateSelf => StatusCode::FORBIDDEN,
        AuthError::UserNotFound | AuthError::ResetNotFound(_) => StatusCode::NOT_FOUND,
        AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::InvalidUsername(_)
        | AuthError::InvalidEmail(_)
        | AuthError::WeakPassword(_)
        | AuthError::ResetNotApproved => StatusCode::BAD_REQUEST,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Authentication failure: {err}");
    }
    error_response(status, err.client_message())
}

pub fn catalog_error(err: CatalogError) -> ApiError {
    let status = match &err {
        CatalogError::Access(e) => return access_error(e.clone()),
        CatalogError::CourtNotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::CourtInUse(_) => StatusCode::CONFLICT,
        CatalogError::InvalidPrice(_)
        | CatalogError::InvalidCapacity(_)
        | CatalogError::InvalidDuration(_)
        | CatalogError::InvalidPlayTimes(_)
        | CatalogError::Slot(_)
        | CatalogError::DateInPast
        | CatalogError::MissingName => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}

pub fn wallet_error(err: WalletError) -> ApiError {
    let status = match &err {
        WalletError::Access(e) => return access_error(e.clone()),
        WalletError::InsufficientFunds { .. } | WalletError::PaymentDeclined(_) => {
            StatusCode::PAYMENT_REQUIRED
        }
        WalletError::WalletNotFound(_) | WalletError::InvoiceNotFound(_) => StatusCode::NOT_FOUND,
        WalletError::InvalidState { .. }
        | WalletError::InvalidAmount(_)
        | WalletError::BelowMinimum { .. }
        | WalletError::AboveMaximum { .. }
        | WalletError::DailyLimitExceeded { .. }
        | WalletError::UnsupportedMethod(_) => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}

pub fn booking_error(err: BookingError) -> ApiError {
    let status = match err {
        BookingError::Catalog(e) => return catalog_error(e),
        BookingError::Wallet(e) => return wallet_error(e),
        BookingError::Access(e) => return access_error(e),
        BookingError::SlotUnavailable { .. } => StatusCode::CONFLICT,
        BookingError::BookingNotFound(_) | BookingError::UserNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::UserInactive => StatusCode::FORBIDDEN,
        BookingError::InvalidSlot { .. } => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}

pub fn feedback_error(err: FeedbackError) -> ApiError {
    let status = match err {
        FeedbackError::Catalog(e) => return catalog_error(e),
        FeedbackError::Access(e) => return access_error(e),
        FeedbackError::ReportNotFound(_) => StatusCode::NOT_FOUND,
        FeedbackError::AlreadyReviewed => StatusCode::CONFLICT,
        FeedbackError::NoBooking => StatusCode::FORBIDDEN,
        FeedbackError::InvalidRating(_)
        | FeedbackError::CommentTooLong { .. }
        | FeedbackError::CourtNotYetAvailable
        | FeedbackError::BookingNotFinished { .. } => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}
