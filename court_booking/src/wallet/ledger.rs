//! Wallet ledger: balances, invoices and the append-only history.
//!
//! Every method checks all of its preconditions before touching any field, so
//! an `Err` always means nothing changed.

use super::{
    errors::{WalletError, WalletResult},
    models::{
        Charge, EntryKind, GatewayReceipt, Invoice, InvoiceId, InvoiceStatus, LedgerEntry,
        PaymentMethod, SystemAccount, Wallet,
    },
};
use crate::{auth::UserId, booking::BookingId};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};

/// Aggregate figures over the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub payments: i64,
    pub refunds: i64,
    pub deposits: i64,
}

/// Wallets, system account, invoices and history
#[derive(Debug, Default)]
pub struct Ledger {
    wallets: HashMap<UserId, Wallet>,
    system: SystemAccount,
    invoices: BTreeMap<InvoiceId, Invoice>,
    entries: Vec<LedgerEntry>,
    last_invoice_id: InvoiceId,
}

impl Ledger {
    /// Open an empty wallet; an existing wallet is left untouched
    pub fn open_wallet(&mut self, user_id: &UserId, now: DateTime<Utc>) -> &Wallet {
        self.wallets
            .entry(user_id.clone())
            .or_insert_with(|| Wallet {
                user_id: user_id.clone(),
                balance: 0,
                created_at: now,
                updated_at: now,
            })
    }

    pub fn wallet(&self, user_id: &UserId) -> WalletResult<&Wallet> {
        self.wallets
            .get(user_id)
            .ok_or_else(|| WalletError::WalletNotFound(user_id.clone()))
    }

    pub fn balance(&self, user_id: &UserId) -> WalletResult<i64> {
        Ok(self.wallet(user_id)?.balance)
    }

    pub fn system_account(&self) -> &SystemAccount {
        &self.system
    }

    pub fn system_balance(&self) -> i64 {
        self.system.balance
    }

    /// Credit a wallet with funds collected by the gateway
    pub fn deposit(
        &mut self,
        user_id: &UserId,
        amount: i64,
        receipt: GatewayReceipt,
        now: DateTime<Utc>,
    ) -> WalletResult<&LedgerEntry> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let wallet = self
            .wallets
            .get_mut(user_id)
            .ok_or_else(|| WalletError::WalletNotFound(user_id.clone()))?;

        wallet.balance += amount;
        wallet.updated_at = now;
        let balance_after = wallet.balance;

        info!("Deposit of {amount} to {user_id} ({})", receipt.reference);
        Ok(self.append(
            user_id.clone(),
            None,
            EntryKind::Deposit,
            amount,
            Some(receipt.method),
            Some(receipt.reference),
            balance_after,
            now,
        ))
    }

    /// Create a Pending invoice
    pub fn create_invoice(
        &mut self,
        user_id: &UserId,
        amount: i64,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> WalletResult<InvoiceId> {
        if amount < 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        self.wallet(user_id)?;
        Ok(self.insert_invoice(user_id, amount, InvoiceStatus::Pending, method, now))
    }

    /// Create an already settled zero-amount invoice; no money moves
    pub fn create_free_invoice(
        &mut self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> WalletResult<InvoiceId> {
        self.wallet(user_id)?;
        Ok(self.insert_invoice(user_id, 0, InvoiceStatus::Paid, PaymentMethod::Free, now))
    }

    /// Settle a Pending invoice.
    ///
    /// Debits the payer (for wallet charges), marks the invoice Paid, credits
    /// the system account and records a Payment entry. Returns the payer's
    /// balance afterwards.
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidState` - Invoice is not Pending
    /// * `WalletError::InsufficientFunds` - Wallet charge exceeds the balance
    pub fn pay(
        &mut self,
        invoice_id: InvoiceId,
        charge: Charge,
        now: DateTime<Utc>,
    ) -> WalletResult<i64> {
        let invoice = self.invoice(invoice_id)?;
        if invoice.status != InvoiceStatus::Pending {
            return Err(WalletError::InvalidState {
                invoice_id,
                expected: InvoiceStatus::Pending,
                actual: invoice.status,
            });
        }
        let amount = invoice.amount;
        let user_id = invoice.user_id.clone();

        let wallet = self
            .wallets
            .get_mut(&user_id)
            .ok_or_else(|| WalletError::WalletNotFound(user_id.clone()))?;
        if charge == Charge::Wallet && wallet.balance < amount {
            return Err(WalletError::InsufficientFunds {
                available: wallet.balance,
                required: amount,
            });
        }

        let (method, reference, card_last_four) = match charge {
            Charge::Wallet => {
                wallet.balance -= amount;
                wallet.updated_at = now;
                (PaymentMethod::Balance, None, None)
            }
            Charge::External(receipt) => {
                (receipt.method, Some(receipt.reference), receipt.card_last_four)
            }
        };
        let balance_after = wallet.balance;

        if let Some(invoice) = self.invoices.get_mut(&invoice_id) {
            invoice.status = InvoiceStatus::Paid;
            invoice.payment_method = method;
            invoice.transaction_ref = reference.clone();
            invoice.card_last_four = card_last_four;
            invoice.updated_at = now;
        }

        self.system.balance += amount;
        self.system.updated_at = Some(now);

        info!("Invoice {invoice_id} paid: {amount} from {user_id} via {method}");
        self.append(
            user_id,
            Some(invoice_id),
            EntryKind::Payment,
            amount,
            Some(method),
            reference,
            balance_after,
            now,
        );
        Ok(balance_after)
    }

    /// Reverse a Paid invoice.
    ///
    /// Credits the payer, marks the invoice Cancelled, debits the system account
    /// and records a Refund entry. If the system account cannot cover the amount
    /// it is left as is and a warning is logged. Returns the payer's balance
    /// afterwards.
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidState` - Invoice is not Paid
    pub fn refund(&mut self, invoice_id: InvoiceId, now: DateTime<Utc>) -> WalletResult<i64> {
        let invoice = self.invoice(invoice_id)?;
        if invoice.status != InvoiceStatus::Paid {
            return Err(WalletError::InvalidState {
                invoice_id,
                expected: InvoiceStatus::Paid,
                actual: invoice.status,
            });
        }
        let amount = invoice.amount;
        let method = invoice.payment_method;
        let user_id = invoice.user_id.clone();

        let wallet = self
            .wallets
            .get_mut(&user_id)
            .ok_or_else(|| WalletError::WalletNotFound(user_id.clone()))?;
        wallet.balance += amount;
        wallet.updated_at = now;
        let balance_after = wallet.balance;

        if let Some(invoice) = self.invoices.get_mut(&invoice_id) {
            invoice.status = InvoiceStatus::Cancelled;
            invoice.updated_at = now;
        }

        if self.system.balance >= amount {
            self.system.balance -= amount;
            self.system.updated_at = Some(now);
        } else {
            warn!(
                "System account holds {} and cannot cover refund of {amount} for invoice {invoice_id}",
                self.system.balance
            );
        }

        info!("Invoice {invoice_id} refunded: {amount} to {user_id}");
        self.append(
            user_id,
            Some(invoice_id),
            EntryKind::Refund,
            amount,
            Some(method),
            None,
            balance_after,
            now,
        );
        Ok(balance_after)
    }

    /// Drop an invoice that never settled
    pub fn discard_pending(&mut self, invoice_id: InvoiceId) -> WalletResult<Invoice> {
        let invoice = self.invoice(invoice_id)?;
        if invoice.status != InvoiceStatus::Pending {
            return Err(WalletError::InvalidState {
                invoice_id,
                expected: InvoiceStatus::Pending,
                actual: invoice.status,
            });
        }
        self.invoices
            .remove(&invoice_id)
            .ok_or(WalletError::InvoiceNotFound(invoice_id))
    }

    /// Point an invoice at its booking, or clear the reference
    pub fn link_booking(
        &mut self,
        invoice_id: InvoiceId,
        booking_id: Option<BookingId>,
    ) -> WalletResult<()> {
        let invoice = self
            .invoices
            .get_mut(&invoice_id)
            .ok_or(WalletError::InvoiceNotFound(invoice_id))?;
        invoice.booking_id = booking_id;
        Ok(())
    }

    pub fn invoice(&self, invoice_id: InvoiceId) -> WalletResult<&Invoice> {
        self.invoices
            .get(&invoice_id)
            .ok_or(WalletError::InvoiceNotFound(invoice_id))
    }

    pub fn invoices_for(&self, user_id: &UserId) -> Vec<&Invoice> {
        self.invoices
            .values()
            .filter(|invoice| &invoice.user_id == user_id)
            .collect()
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    /// Sum of the invoices currently in the Paid state
    pub fn outstanding_paid(&self) -> i64 {
        self.invoices
            .values()
            .filter(|invoice| invoice.status == InvoiceStatus::Paid)
            .map(|invoice| invoice.amount)
            .sum()
    }

    /// A user's history, newest first
    pub fn entries_for(&self, user_id: &UserId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| &entry.user_id == user_id)
            .collect()
    }

    /// Payments and refunds against invoices, newest first
    pub fn revenue_history(&self) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.invoice_id.is_some())
            .collect()
    }

    /// Total deposited by a user at or after `since`
    pub fn deposited_since(&self, user_id: &UserId, since: DateTime<Utc>) -> i64 {
        self.entries
            .iter()
            .filter(|entry| {
                entry.kind == EntryKind::Deposit
                    && &entry.user_id == user_id
                    && entry.created_at >= since
            })
            .map(|entry| entry.amount)
            .sum()
    }

    pub fn totals(&self) -> LedgerTotals {
        self.entries
            .iter()
            .fold(LedgerTotals::default(), |mut totals, entry| {
                match entry.kind {
                    EntryKind::Deposit => totals.deposits += entry.amount,
                    EntryKind::Payment => totals.payments += entry.amount,
                    EntryKind::Refund => totals.refunds += entry.amount,
                }
                totals
            })
    }

    fn insert_invoice(
        &mut self,
        user_id: &UserId,
        amount: i64,
        status: InvoiceStatus,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> InvoiceId {
        self.last_invoice_id += 1;
        let id = self.last_invoice_id;
        self.invoices.insert(
            id,
            Invoice {
                id,
                user_id: user_id.clone(),
                booking_id: None,
                amount,
                status,
                payment_method: method,
                card_last_four: None,
                transaction_ref: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn append(
        &mut self,
        user_id: UserId,
        invoice_id: Option<InvoiceId>,
        kind: EntryKind,
        amount: i64,
        payment_method: Option<PaymentMethod>,
        reference: Option<String>,
        balance_after: i64,
        now: DateTime<Utc>,
    ) -> &LedgerEntry {
        let id = self.entries.len() as i64 + 1;
        self.entries.push(LedgerEntry {
            id,
            user_id,
            invoice_id,
            kind,
            amount,
            payment_method,
            reference,
            balance_after,
            created_at: now,
        });
        &self.entries[self.entries.len() - 1]
    }
}
