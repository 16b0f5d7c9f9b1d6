//! Table set held by the store.

use crate::{
    auth::Accounts, booking::BookingLedger, catalog::CourtCatalog, feedback::FeedbackBoard,
    wallet::Ledger,
};

/// Every table of the application
#[derive(Debug, Default)]
pub struct Tables {
    pub accounts: Accounts,
    pub catalog: CourtCatalog,
    pub bookings: BookingLedger,
    pub ledger: Ledger,
    pub feedback: FeedbackBoard,
}
