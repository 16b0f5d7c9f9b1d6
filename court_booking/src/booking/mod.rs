//! Court slot reservations.
//!
//! At most one active booking holds any hour of a court. Booking a slot settles
//! an invoice for the court price; cancelling refunds it to the payer's wallet.

pub mod errors;
pub mod ledger;
pub mod manager;
pub mod models;

pub use errors::{BookingError, BookingResult};
pub use ledger::BookingLedger;
pub use manager::BookingManager;
pub use models::{Booking, BookingId, BookingReceipt, BookingRequest, CancellationReceipt};
