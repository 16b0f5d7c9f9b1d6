//! Wallet error types.

use super::models::{InvoiceId, InvoiceStatus};
use crate::auth::{AccessError, UserId};
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Insufficient balance
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// Invoice is not in the state the operation requires
    #[error("Invoice {invoice_id} is {actual}, expected {expected}")]
    InvalidState {
        invoice_id: InvoiceId,
        expected: InvoiceStatus,
        actual: InvoiceStatus,
    },

    /// Wallet not found
    #[error("Wallet not found for user {0}")]
    WalletNotFound(UserId),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Top-up below the per-transaction minimum
    #[error("Minimum top-up amount is {minimum}")]
    BelowMinimum { minimum: i64 },

    /// Top-up above the per-transaction maximum
    #[error("Maximum top-up amount is {maximum} per transaction")]
    AboveMaximum { maximum: i64 },

    /// Daily deposit limit reached
    #[error("Daily limit exceeded ({limit}); already deposited today: {deposited}")]
    DailyLimitExceeded { limit: i64, deposited: i64 },

    /// Payment method cannot be used for this operation
    #[error("Payment method not supported here: {0}")]
    UnsupportedMethod(String),

    /// Simulated gateway refused the payment details
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// Caller lacks the capability
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak identifiers
    pub fn client_message(&self) -> String {
        match self {
            WalletError::WalletNotFound(_) => "Wallet not found".to_string(),
            WalletError::InvoiceNotFound(_) => "Invoice not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
