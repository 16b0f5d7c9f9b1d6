//! Wallet API handlers.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use court_booking::{
    auth::Actor,
    wallet::{Invoice, InvoiceId, LedgerEntry, PaymentDetails, TopUpReceipt, Wallet},
};
use serde::Deserialize;

use super::{
    AppState,
    errors::{ApiResult, wallet_error},
};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct TopUpPayload {
    pub amount_cents: i64,
    pub payment: PaymentDetails,
}

pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state
        .wallet_manager
        .get_wallet(&actor.user_id)
        .await
        .map_err(wallet_error)?;
    Ok(Json(wallet))
}

/// Caller's ledger history, newest first
pub async fn transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    let entries = state
        .wallet_manager
        .transactions(&actor.user_id)
        .await
        .map_err(wallet_error)?;
    Ok(Json(entries))
}

pub async fn invoices(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Json<Vec<Invoice>> {
    Json(state.wallet_manager.invoices(&actor.user_id).await)
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(invoice_id): Path<InvoiceId>,
) -> ApiResult<Json<Invoice>> {
    let invoice = state
        .wallet_manager
        .get_invoice(&actor, invoice_id)
        .await
        .map_err(wallet_error)?;
    Ok(Json(invoice))
}

/// Deposit money through the payment gateway.
///
/// # Request Body
///
/// ```json
/// { "amount_cents": 15000, "payment": { "method": "bank_transfer" } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Amount outside the configured limits, daily limit
///   reached, or `balance` given as the payment method
/// - `402 Payment Required`: Card declined
pub async fn top_up(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<TopUpPayload>,
) -> ApiResult<Json<TopUpReceipt>> {
    let receipt = state
        .wallet_manager
        .top_up(&actor.user_id, payload.amount_cents, &payload.payment)
        .await
        .map_err(wallet_error)?;
    metrics::top_ups_total(
        &payload.payment.method().to_string(),
        payload.amount_cents,
    );
    Ok(Json(receipt))
}
