//! Booking manager: reserve, cancel and reschedule court slots.
//!
//! Each operation runs under a single write guard of the store. All checks come
//! first; effects are applied only once nothing can fail, so the booking, its
//! invoice, the payer's wallet and the system account change together.

use super::{
    errors::{BookingError, BookingResult},
    models::{Booking, BookingId, BookingReceipt, BookingRequest, CancellationReceipt},
};
use crate::{
    auth::{AccessPolicy, Actor, Capability, UserId},
    catalog::{CourtId, CourtStatus, TimeSlot},
    db::{Database, Tables},
    wallet::{Charge, InvoiceStatus, PaymentDetails, PaymentGateway, WalletError},
};
use chrono::Utc;
use log::info;
use std::sync::Arc;

/// Booking manager
#[derive(Clone)]
pub struct BookingManager {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
}

impl BookingManager {
    /// Create a new booking manager
    ///
    /// # Arguments
    ///
    /// * `db` - Shared store
    /// * `gateway` - Gateway charged for non-wallet payment methods
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { db, gateway }
    }

    /// Book a slot and settle its invoice
    ///
    /// Zero-price courts get an invoice that is already Paid with amount 0.
    /// Otherwise a Pending invoice for the court price is created and paid from
    /// the wallet or through the gateway.
    ///
    /// # Arguments
    ///
    /// * `actor` - The user booking the slot
    /// * `request` - Court, slot and payment details
    ///
    /// # Returns
    ///
    /// * `BookingResult<BookingReceipt>` - Booking, settled invoice and balances
    ///
    /// # Errors
    ///
    /// * `BookingError::InvalidSlot` - Slot not offered by the court
    /// * `BookingError::SlotUnavailable` - Slot taken or court under repair
    /// * `BookingError::Wallet` - Insufficient funds or declined payment
    pub async fn book(
        &self,
        actor: &Actor,
        request: BookingRequest,
    ) -> BookingResult<BookingReceipt> {
        let BookingRequest {
            court_id,
            slot,
            payment,
        } = request;
        let user_id = &actor.user_id;
        let now = Utc::now();

        let mut guard = self.db.write().await;
        let tables = &mut *guard;
        ensure_active(tables, user_id)?;
        let price = check_bookable(tables, court_id, slot, None)?;

        let invoice_id = if price == 0 {
            tables.ledger.create_free_invoice(user_id, now)?
        } else {
            let charge = match &payment {
                PaymentDetails::Balance => {
                    let available = tables.ledger.balance(user_id)?;
                    if available < price {
                        return Err(WalletError::InsufficientFunds {
                            available,
                            required: price,
                        }
                        .into());
                    }
                    Charge::Wallet
                }
                // Charged under the write guard: a slot is never paid for twice
                // and a declined charge leaves nothing to undo, at the cost of
                // stalling other writers for the gateway round trip.
                details => Charge::External(self.gateway.charge(user_id, price, details).await?),
            };

            let invoice_id = tables
                .ledger
                .create_invoice(user_id, price, payment.method(), now)?;
            if let Err(e) = tables.ledger.pay(invoice_id, charge, now) {
                tables.ledger.discard_pending(invoice_id)?;
                return Err(e.into());
            }
            invoice_id
        };

        let booking = tables
            .bookings
            .reserve(user_id, court_id, slot, invoice_id, now)?
            .clone();
        tables.ledger.link_booking(invoice_id, Some(booking.id))?;

        let invoice = tables.ledger.invoice(invoice_id)?.clone();
        let wallet_balance = tables.ledger.balance(user_id)?;
        let system_balance = tables.ledger.system_balance();

        info!(
            "Booking {} created: court {court_id} slot {slot} for {user_id} ({} via {})",
            booking.id, invoice.amount, invoice.payment_method
        );
        Ok(BookingReceipt {
            booking,
            invoice,
            wallet_balance,
            system_balance,
        })
    }

    /// Cancel a booking and refund its invoice to the payer's wallet
    ///
    /// The slot is put back on the court's list if it went missing.
    ///
    /// # Errors
    ///
    /// * `BookingError::BookingNotFound` - No such active booking
    /// * `BookingError::Access` - Booking belongs to someone else
    pub async fn cancel(
        &self,
        actor: &Actor,
        booking_id: BookingId,
    ) -> BookingResult<CancellationReceipt> {
        let now = Utc::now();
        let mut guard = self.db.write().await;
        let tables = &mut *guard;

        let booking = tables.bookings.get(booking_id)?;
        ensure_owner_or(actor, &booking.user_id)?;
        tables.catalog.get(booking.court_id)?;
        let invoice = tables.ledger.invoice(booking.invoice_id)?;
        if invoice.status != InvoiceStatus::Paid {
            return Err(WalletError::InvalidState {
                invoice_id: invoice.id,
                expected: InvoiceStatus::Paid,
                actual: invoice.status,
            }
            .into());
        }

        let booking = tables.bookings.remove(booking_id)?;
        if tables.catalog.restore_slot(booking.court_id, booking.slot)? {
            info!(
                "Slot {} restored on court {} after cancelling booking {booking_id}",
                booking.slot, booking.court_id
            );
        }
        let wallet_balance = tables.ledger.refund(booking.invoice_id, now)?;
        tables.ledger.link_booking(booking.invoice_id, None)?;

        let invoice = tables.ledger.invoice(booking.invoice_id)?.clone();
        let system_balance = tables.ledger.system_balance();

        info!(
            "Booking {booking_id} cancelled by {}, refunded {} to {}",
            actor.user_id, invoice.amount, booking.user_id
        );
        Ok(CancellationReceipt {
            booking,
            invoice,
            wallet_balance,
            system_balance,
        })
    }

    /// Move a booking to another slot of the same court; no money moves
    ///
    /// # Errors
    ///
    /// * `BookingError::InvalidSlot` - Target slot not offered by the court
    /// * `BookingError::SlotUnavailable` - Target taken or court under repair
    pub async fn reschedule(
        &self,
        actor: &Actor,
        booking_id: BookingId,
        slot: TimeSlot,
    ) -> BookingResult<Booking> {
        let mut guard = self.db.write().await;
        let tables = &mut *guard;

        let booking = tables.bookings.get(booking_id)?;
        ensure_owner_or(actor, &booking.user_id)?;
        if booking.slot == slot {
            return Ok(booking.clone());
        }
        let (court_id, from) = (booking.court_id, booking.slot);
        check_bookable(tables, court_id, slot, Some(booking_id))?;

        let booking = tables.bookings.move_to(booking_id, slot)?.clone();
        info!("Booking {booking_id} moved on court {court_id} from {from} to {slot}");
        Ok(booking)
    }

    /// Court slots not held by any booking
    pub async fn available_slots(&self, court_id: CourtId) -> BookingResult<Vec<TimeSlot>> {
        let tables = self.db.read().await;
        let court = tables.catalog.get(court_id)?;
        Ok(court
            .play_times
            .iter()
            .filter(|slot| tables.bookings.is_free(court_id, slot))
            .copied()
            .collect())
    }

    pub async fn get_booking(&self, actor: &Actor, booking_id: BookingId) -> BookingResult<Booking> {
        let tables = self.db.read().await;
        let booking = tables.bookings.get(booking_id)?;
        ensure_owner_or(actor, &booking.user_id)?;
        Ok(booking.clone())
    }

    pub async fn bookings_for(&self, user_id: &UserId) -> Vec<Booking> {
        let tables = self.db.read().await;
        tables.bookings.for_user(user_id).cloned().collect()
    }

    /// Every active booking
    pub async fn all_bookings(&self, actor: &Actor) -> BookingResult<Vec<Booking>> {
        AccessPolicy::require(actor, Capability::ManageAllBookings)?;
        let tables = self.db.read().await;
        Ok(tables.bookings.iter().cloned().collect())
    }
}

fn ensure_active(tables: &Tables, user_id: &UserId) -> BookingResult<()> {
    let user = tables
        .accounts
        .user(user_id)
        .ok_or_else(|| BookingError::UserNotFound(user_id.clone()))?;
    if !user.is_active {
        return Err(BookingError::UserInactive);
    }
    Ok(())
}

fn ensure_owner_or(actor: &Actor, owner: &UserId) -> BookingResult<()> {
    if &actor.user_id != owner {
        AccessPolicy::require(actor, Capability::ManageAllBookings)?;
    }
    Ok(())
}

/// Check that `slot` can be taken on `court_id`, ignoring the booking being
/// moved. Returns the court price.
fn check_bookable(
    tables: &Tables,
    court_id: CourtId,
    slot: TimeSlot,
    moving: Option<BookingId>,
) -> BookingResult<i64> {
    let court = tables.catalog.get(court_id)?;
    if !court.offers(&slot) {
        return Err(BookingError::InvalidSlot { court_id, slot });
    }
    if court.status == CourtStatus::Repairing {
        return Err(BookingError::SlotUnavailable { court_id, slot });
    }
    if tables.bookings.conflict(court_id, &slot, moving).is_some() {
        return Err(BookingError::SlotUnavailable { court_id, slot });
    }
    Ok(court.price_cents)
}
