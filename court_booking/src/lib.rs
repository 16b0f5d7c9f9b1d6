//! # Court Booking
//!
//! Booking and account management for tennis courts: a court catalog with a
//! slot generator, a booking ledger enforcing slot exclusivity, and a wallet
//! ledger that keeps user balances, the system account and invoice history
//! consistent across payments and refunds.
//!
//! ## Architecture
//!
//! All state lives in one in-process [`db::Database`]. Every mutating operation
//! takes the store's write guard exactly once, checks its preconditions and only
//! then applies its effects, so a booking, its invoice, the payer's balance and
//! the system account always move together.
//!
//! Amounts are integer cents throughout.
//!
//! ## Core Modules
//!
//! - [`catalog`]: Courts, court status, and the slot generator
//! - [`booking`]: Slot reservations, cancellations, rescheduling
//! - [`wallet`]: Wallets, invoices, the system account and ledger history
//! - [`auth`]: Accounts, JWT access tokens and capability checks
//! - [`feedback`]: Court condition reports and reviews
//! - [`analytics`]: Admin dashboard figures
//!
//! ## Example
//!
//! ```
//! use court_booking::catalog::generate_slots;
//!
//! let slots: Vec<String> = generate_slots(5).iter().map(|s| s.to_string()).collect();
//! assert_eq!(slots, vec!["8 hours -13 hours", "13 hours - 18 hours"]);
//! ```

pub mod analytics;
pub mod auth;
pub mod booking;
pub mod catalog;
pub mod db;
pub mod feedback;
pub mod wallet;

pub use analytics::AnalyticsManager;
pub use auth::{AccessPolicy, Actor, AuthManager, Capability, Role, UserId};
pub use booking::BookingManager;
pub use catalog::{CatalogManager, CourtId, TimeSlot};
pub use db::Database;
pub use feedback::FeedbackManager;
pub use wallet::{PaymentGateway, SimulatedGateway, WalletManager};
