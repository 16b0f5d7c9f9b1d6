//! Wallet manager: balances, top-ups and history queries.

use super::{
    config::TopUpLimits,
    errors::{WalletError, WalletResult},
    gateway::PaymentGateway,
    models::{Invoice, InvoiceId, LedgerEntry, PaymentDetails, Wallet},
};
use crate::{
    auth::{AccessPolicy, Actor, Capability, UserId},
    db::Database,
};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful top-up
#[derive(Debug, Clone, Serialize)]
pub struct TopUpReceipt {
    pub entry: LedgerEntry,
    pub balance: i64,
}

/// Wallet manager
#[derive(Clone)]
pub struct WalletManager {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
    limits: TopUpLimits,
}

impl WalletManager {
    /// Create a new wallet manager
    ///
    /// # Arguments
    ///
    /// * `db` - Shared store
    /// * `gateway` - Gateway used to collect top-ups
    /// * `limits` - Top-up limits
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>, limits: TopUpLimits) -> Self {
        Self {
            db,
            gateway,
            limits,
        }
    }

    pub fn limits(&self) -> TopUpLimits {
        self.limits
    }

    /// Get a user's wallet
    pub async fn get_wallet(&self, user_id: &UserId) -> WalletResult<Wallet> {
        let tables = self.db.read().await;
        Ok(tables.ledger.wallet(user_id)?.clone())
    }

    /// Current system account balance
    pub async fn system_balance(&self, actor: &Actor) -> WalletResult<i64> {
        AccessPolicy::require(actor, Capability::ViewRevenue)?;
        Ok(self.db.read().await.ledger.system_balance())
    }

    /// Deposit money into a user's wallet through the payment gateway
    ///
    /// # Arguments
    ///
    /// * `user_id` - Wallet owner
    /// * `amount` - Amount in cents
    /// * `details` - External payment method; the wallet itself is not accepted
    ///
    /// # Returns
    ///
    /// * `WalletResult<TopUpReceipt>` - Deposit entry and new balance
    ///
    /// # Errors
    ///
    /// * `WalletError::BelowMinimum` / `AboveMaximum` - Amount outside per-transaction limits
    /// * `WalletError::DailyLimitExceeded` - Today's deposits would pass the daily limit
    /// * `WalletError::UnsupportedMethod` - `details` is the wallet balance
    /// * `WalletError::PaymentDeclined` - Gateway refused the details
    pub async fn top_up(
        &self,
        user_id: &UserId,
        amount: i64,
        details: &PaymentDetails,
    ) -> WalletResult<TopUpReceipt> {
        if amount < self.limits.min_cents {
            return Err(WalletError::BelowMinimum {
                minimum: self.limits.min_cents,
            });
        }
        if amount > self.limits.max_cents {
            return Err(WalletError::AboveMaximum {
                maximum: self.limits.max_cents,
            });
        }
        if matches!(details, PaymentDetails::Balance) {
            return Err(WalletError::UnsupportedMethod(details.method().to_string()));
        }

        let now = Utc::now();
        let mut tables = self.db.write().await;
        tables.ledger.wallet(user_id)?;

        let deposited = tables.ledger.deposited_since(user_id, start_of_day(now));
        if deposited + amount > self.limits.daily_limit_cents {
            return Err(WalletError::DailyLimitExceeded {
                limit: self.limits.daily_limit_cents,
                deposited,
            });
        }

        // Held across the charge so concurrent top-ups cannot both pass the
        // daily limit check. Gateways must answer quickly.
        let receipt = self.gateway.charge(user_id, amount, details).await?;
        let entry = tables.ledger.deposit(user_id, amount, receipt, now)?.clone();

        info!(
            "User {user_id} topped up {amount}, balance now {}",
            entry.balance_after
        );
        Ok(TopUpReceipt {
            balance: entry.balance_after,
            entry,
        })
    }

    /// A user's history, newest first
    pub async fn transactions(&self, user_id: &UserId) -> WalletResult<Vec<LedgerEntry>> {
        let tables = self.db.read().await;
        tables.ledger.wallet(user_id)?;
        Ok(tables
            .ledger
            .entries_for(user_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn invoices(&self, user_id: &UserId) -> Vec<Invoice> {
        let tables = self.db.read().await;
        tables
            .ledger
            .invoices_for(user_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Fetch an invoice owned by the actor; revenue viewers may see any
    pub async fn get_invoice(&self, actor: &Actor, invoice_id: InvoiceId) -> WalletResult<Invoice> {
        let tables = self.db.read().await;
        let invoice = tables.ledger.invoice(invoice_id)?;
        if invoice.user_id != actor.user_id {
            AccessPolicy::require(actor, Capability::ViewRevenue)?;
        }
        Ok(invoice.clone())
    }

    /// Payments and refunds across all users, newest first
    pub async fn revenue_history(&self, actor: &Actor) -> WalletResult<Vec<LedgerEntry>> {
        AccessPolicy::require(actor, Capability::ViewRevenue)?;
        let tables = self.db.read().await;
        Ok(tables.ledger.revenue_history().into_iter().cloned().collect())
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
