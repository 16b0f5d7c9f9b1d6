//! In-process store shared by every manager.
//!
//! All tables sit behind a single `RwLock`. Readers share the lock; each
//! mutating operation holds the write guard for its whole duration, which makes
//! the guard the transaction boundary: effects become visible together or not
//! at all.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod tables;

pub use tables::Tables;

/// Shared handle to the store
#[derive(Clone, Default)]
pub struct Database {
    tables: Arc<RwLock<Tables>>,
}

/// Row counts reported by [`Database::health_check`]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatabaseStats {
    pub users: usize,
    pub courts: usize,
    pub active_bookings: usize,
    pub invoices: usize,
}

impl Database {
    /// Create an empty store
    ///
    /// # Examples
    ///
    /// ```
    /// use court_booking::db::Database;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let db = Database::new();
    /// assert_eq!(db.health_check().await.courts, 0);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire shared read access
    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    /// Acquire exclusive write access
    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }

    /// Report table sizes once any in-flight writer has finished
    pub async fn health_check(&self) -> DatabaseStats {
        let tables = self.read().await;
        DatabaseStats {
            users: tables.accounts.len(),
            courts: tables.catalog.len(),
            active_bookings: tables.bookings.len(),
            invoices: tables.ledger.invoice_count(),
        }
    }
}
