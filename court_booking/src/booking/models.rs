//! Booking data models.

use crate::{
    auth::UserId,
    catalog::{CourtId, TimeSlot},
    wallet::{Invoice, InvoiceId, PaymentDetails},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking ID type
pub type BookingId = i64;

/// An active reservation of one slot on one court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub court_id: CourtId,
    pub slot: TimeSlot,
    pub invoice_id: InvoiceId,
    pub created_at: DateTime<Utc>,
}

/// Booking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub court_id: CourtId,
    pub slot: TimeSlot,
    /// Ignored for free courts
    #[serde(default = "wallet_payment")]
    pub payment: PaymentDetails,
}

fn wallet_payment() -> PaymentDetails {
    PaymentDetails::Balance
}

/// Result of a successful booking
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub invoice: Invoice,
    /// Payer's wallet balance after payment
    pub wallet_balance: i64,
    pub system_balance: i64,
}

/// Result of a cancellation
#[derive(Debug, Clone, Serialize)]
pub struct CancellationReceipt {
    pub booking: Booking,
    pub invoice: Invoice,
    /// Payer's wallet balance after the refund
    pub wallet_balance: i64,
    pub system_balance: i64,
}
