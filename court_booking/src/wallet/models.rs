//! Wallet data models.
//!
//! All amounts are integer cents.

use crate::{auth::UserId, booking::BookingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invoice ID type
pub type InvoiceId = i64;

/// Wallet model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: UserId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The platform's own account; receives payments and pays out refunds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemAccount {
    pub balance: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Invoice settlement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "Pending"),
            InvoiceStatus::Paid => write!(f, "Paid"),
            InvoiceStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// How an invoice or a deposit was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Balance,
    CreditCard,
    Momo,
    BankTransfer,
    VnPay,
    ZaloPay,
    Free,
}

impl PaymentMethod {
    /// Reference prefix used by the simulated gateway
    pub fn reference_prefix(&self) -> Option<&'static str> {
        match self {
            PaymentMethod::CreditCard => Some("CC"),
            PaymentMethod::Momo => Some("MOMO"),
            PaymentMethod::BankTransfer => Some("BANK"),
            PaymentMethod::VnPay => Some("VNPAY"),
            PaymentMethod::ZaloPay => Some("ZALO"),
            PaymentMethod::Balance | PaymentMethod::Free => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Balance => write!(f, "balance"),
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::Momo => write!(f, "momo"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::VnPay => write!(f, "vnpay"),
            PaymentMethod::ZaloPay => write!(f, "zalopay"),
            PaymentMethod::Free => write!(f, "free"),
        }
    }
}

/// Payment details supplied by the payer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Balance,
    CreditCard {
        card_number: String,
        cvv: String,
        /// `MM/YY`
        #[serde(default)]
        expiry: String,
    },
    Momo,
    BankTransfer,
    VnPay,
    ZaloPay,
}

impl PaymentDetails {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Balance => PaymentMethod::Balance,
            PaymentDetails::CreditCard { .. } => PaymentMethod::CreditCard,
            PaymentDetails::Momo => PaymentMethod::Momo,
            PaymentDetails::BankTransfer => PaymentMethod::BankTransfer,
            PaymentDetails::VnPay => PaymentMethod::VnPay,
            PaymentDetails::ZaloPay => PaymentMethod::ZaloPay,
        }
    }
}

/// Invoice model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    /// Cleared once the booking is cancelled
    pub booking_id: Option<BookingId>,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub payment_method: PaymentMethod,
    pub card_last_four: Option<String>,
    pub transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where the money for a payment comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charge {
    /// Debit the payer's wallet
    Wallet,
    /// Already collected by the payment gateway
    External(GatewayReceipt),
}

/// Receipt from the payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReceipt {
    pub method: PaymentMethod,
    pub reference: String,
    pub card_last_four: Option<String>,
}

/// Ledger entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Deposit,
    Payment,
    Refund,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Deposit => write!(f, "Deposit"),
            EntryKind::Payment => write!(f, "Payment"),
            EntryKind::Refund => write!(f, "Refund"),
        }
    }
}

/// Append-only history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: UserId,
    pub invoice_id: Option<InvoiceId>,
    pub kind: EntryKind,
    pub amount: i64,
    pub payment_method: Option<PaymentMethod>,
    pub reference: Option<String>,
    /// Payer's wallet balance once the entry was applied
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}
