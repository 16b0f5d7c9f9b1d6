//! Wallets, invoices and the system account.
//!
//! This module implements:
//! - Per-user wallets and the singleton system account, in integer cents
//! - The invoice state machine: Pending, then Paid via `pay`, then Cancelled via `refund`
//! - An append-only history of deposits, payments and refunds
//! - Simulated external payment methods and wallet top-ups
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use court_booking::wallet::{Charge, GatewayReceipt, Ledger, PaymentMethod};
//!
//! let mut ledger = Ledger::default();
//! let user = "U0000ABCD".to_string();
//! let now = Utc::now();
//! ledger.open_wallet(&user, now);
//!
//! let receipt = GatewayReceipt {
//!     method: PaymentMethod::BankTransfer,
//!     reference: "BANK-0123456789AB".to_string(),
//!     card_last_four: None,
//! };
//! ledger.deposit(&user, 15_000, receipt, now).unwrap();
//!
//! let invoice = ledger.create_invoice(&user, 10_000, PaymentMethod::Balance, now).unwrap();
//! assert_eq!(ledger.pay(invoice, Charge::Wallet, now).unwrap(), 5_000);
//! assert_eq!(ledger.system_balance(), 10_000);
//!
//! assert_eq!(ledger.refund(invoice, now).unwrap(), 15_000);
//! assert_eq!(ledger.system_balance(), 0);
//! ```

pub mod config;
pub mod errors;
pub mod gateway;
pub mod ledger;
pub mod manager;
pub mod models;

pub use config::TopUpLimits;
pub use errors::{WalletError, WalletResult};
pub use gateway::{PaymentGateway, SimulatedGateway};
pub use ledger::{Ledger, LedgerTotals};
pub use manager::{TopUpReceipt, WalletManager};
pub use models::{
    Charge, EntryKind, GatewayReceipt, Invoice, InvoiceId, InvoiceStatus, LedgerEntry,
    PaymentDetails, PaymentMethod, SystemAccount, Wallet,
};
