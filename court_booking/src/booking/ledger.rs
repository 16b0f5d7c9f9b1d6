//! Table of active bookings.
//!
//! Exclusivity is checked per court by interval overlap, so a booking also
//! blocks slots of a different length that share any hour with it. This covers
//! bookings made before a court's duration was changed.

use super::{
    errors::{BookingError, BookingResult},
    models::{Booking, BookingId},
};
use crate::{
    auth::UserId,
    catalog::{CourtId, TimeSlot},
    wallet::InvoiceId,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Active bookings indexed by id and by court
#[derive(Debug, Default)]
pub struct BookingLedger {
    bookings: BTreeMap<BookingId, Booking>,
    by_court: HashMap<CourtId, BTreeMap<TimeSlot, BookingId>>,
    last_id: BookingId,
}

impl BookingLedger {
    /// The booking holding an hour of `slot` on `court_id`, other than `except`
    pub fn conflict(
        &self,
        court_id: CourtId,
        slot: &TimeSlot,
        except: Option<BookingId>,
    ) -> Option<BookingId> {
        self.by_court.get(&court_id).and_then(|taken| {
            taken
                .iter()
                .find(|(booked, id)| Some(**id) != except && booked.overlaps(slot))
                .map(|(_, id)| *id)
        })
    }

    pub fn is_free(&self, court_id: CourtId, slot: &TimeSlot) -> bool {
        self.conflict(court_id, slot, None).is_none()
    }

    /// Record a booking.
    ///
    /// # Errors
    ///
    /// * `BookingError::SlotUnavailable` - An active booking overlaps the slot
    pub fn reserve(
        &mut self,
        user_id: &UserId,
        court_id: CourtId,
        slot: TimeSlot,
        invoice_id: InvoiceId,
        now: DateTime<Utc>,
    ) -> BookingResult<&Booking> {
        if !self.is_free(court_id, &slot) {
            return Err(BookingError::SlotUnavailable { court_id, slot });
        }

        self.last_id += 1;
        let id = self.last_id;
        self.by_court.entry(court_id).or_default().insert(slot, id);
        let booking = self.bookings.entry(id).or_insert(Booking {
            id,
            user_id: user_id.clone(),
            court_id,
            slot,
            invoice_id,
            created_at: now,
        });
        Ok(booking)
    }

    pub fn remove(&mut self, id: BookingId) -> BookingResult<Booking> {
        let booking = self
            .bookings
            .remove(&id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if let Some(taken) = self.by_court.get_mut(&booking.court_id) {
            taken.remove(&booking.slot);
            if taken.is_empty() {
                self.by_court.remove(&booking.court_id);
            }
        }
        Ok(booking)
    }

    /// Move a booking to another slot of the same court
    ///
    /// # Errors
    ///
    /// * `BookingError::SlotUnavailable` - Another booking overlaps the target
    pub fn move_to(&mut self, id: BookingId, slot: TimeSlot) -> BookingResult<&Booking> {
        let booking = self.get(id)?;
        let (court_id, current) = (booking.court_id, booking.slot);

        if self.conflict(court_id, &slot, Some(id)).is_some() {
            return Err(BookingError::SlotUnavailable { court_id, slot });
        }

        if let Some(taken) = self.by_court.get_mut(&court_id) {
            taken.remove(&current);
            taken.insert(slot, id);
        }
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or(BookingError::BookingNotFound(id))?;
        booking.slot = slot;
        Ok(booking)
    }

    pub fn get(&self, id: BookingId) -> BookingResult<&Booking> {
        self.bookings
            .get(&id)
            .ok_or(BookingError::BookingNotFound(id))
    }

    pub fn for_user<'a, 'u>(&'a self, user_id: &'u UserId) -> impl Iterator<Item = &'a Booking> {
        self.bookings
            .values()
            .filter(move |booking| &booking.user_id == user_id)
    }

    /// Slots currently taken on a court, in order
    pub fn occupied(&self, court_id: CourtId) -> Vec<TimeSlot> {
        self.by_court
            .get(&court_id)
            .map(|taken| taken.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_active_on(&self, court_id: CourtId) -> bool {
        self.by_court.contains_key(&court_id)
    }

    /// Whether `user_id` holds any booking on `court_id`
    /// Lowest-id booking a user holds on a court
    pub fn first_booking_on(&self, user_id: &UserId, court_id: CourtId) -> Option<&Booking> {
        self.for_user(user_id)
            .find(|booking| booking.court_id == court_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: u8, end: u8) -> TimeSlot {
        TimeSlot::new(start, end).unwrap()
    }

    fn user(n: u8) -> UserId {
        format!("U0000000{n}")
    }

    #[test]
    fn test_same_slot_is_exclusive() {
        let mut ledger = BookingLedger::default();
        let now = Utc::now();
        ledger.reserve(&user(1), 1, slot(8, 10), 1, now).unwrap();

        let err = ledger.reserve(&user(2), 1, slot(8, 10), 2, now).unwrap_err();
        assert!(matches!(err, BookingError::SlotUnavailable { court_id: 1, .. }));

        // Other courts are independent
        ledger.reserve(&user(2), 2, slot(8, 10), 2, now).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_overlapping_slots_conflict() {
        let mut ledger = BookingLedger::default();
        let now = Utc::now();
        ledger.reserve(&user(1), 1, slot(8, 12), 1, now).unwrap();

        assert!(!ledger.is_free(1, &slot(10, 13)));
        assert!(ledger.is_free(1, &slot(12, 14)));
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut ledger = BookingLedger::default();
        let now = Utc::now();
        let id = ledger.reserve(&user(1), 1, slot(8, 10), 1, now).unwrap().id;
        assert!(ledger.has_active_on(1));

        ledger.remove(id).unwrap();
        assert!(ledger.is_free(1, &slot(8, 10)));
        assert!(!ledger.has_active_on(1));
        assert!(matches!(
            ledger.remove(id),
            Err(BookingError::BookingNotFound(_))
        ));
    }

    #[test]
    fn test_move_to() {
        let mut ledger = BookingLedger::default();
        let now = Utc::now();
        let first = ledger.reserve(&user(1), 1, slot(8, 10), 1, now).unwrap().id;
        ledger.reserve(&user(2), 1, slot(12, 14), 2, now).unwrap();

        assert!(matches!(
            ledger.move_to(first, slot(12, 14)),
            Err(BookingError::SlotUnavailable { .. })
        ));

        // Shifting within its own hours only conflicts with itself
        let moved = ledger.move_to(first, slot(9, 11)).unwrap();
        assert_eq!(moved.slot, slot(9, 11));
        assert!(ledger.is_free(1, &slot(8, 9)));
        assert_eq!(ledger.occupied(1), vec![slot(9, 11), slot(12, 14)]);
    }

    #[test]
    fn test_for_user() {
        let mut ledger = BookingLedger::default();
        let now = Utc::now();
        ledger.reserve(&user(1), 1, slot(8, 10), 1, now).unwrap();
        ledger.reserve(&user(1), 2, slot(8, 10), 2, now).unwrap();
        ledger.reserve(&user(2), 1, slot(10, 12), 3, now).unwrap();

        assert_eq!(ledger.for_user(&user(1)).count(), 2);
        ledger.reserve(&user(1), 1, slot(14, 16), 4, now).unwrap();
        assert_eq!(ledger.first_booking_on(&user(1), 1).map(|b| b.invoice_id), Some(1));
        assert_eq!(ledger.first_booking_on(&user(2), 1).map(|b| b.invoice_id), Some(3));
        assert!(ledger.first_booking_on(&user(2), 2).is_none());
    }
}
