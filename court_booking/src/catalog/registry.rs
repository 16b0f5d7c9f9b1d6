//! In-memory court table.

use super::{
    errors::{CatalogError, CatalogResult},
    models::{Court, CourtId, CourtQuery, CourtStatus, CourtUpdate, NewCourt},
    slots::{TimeSlot, generate_slots},
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// Court table keyed by ID
#[derive(Debug, Default)]
pub struct CourtCatalog {
    courts: BTreeMap<CourtId, Court>,
    last_id: CourtId,
}

impl CourtCatalog {
    /// Validate and insert a new court, returning its ID
    pub fn insert(
        &mut self,
        new: NewCourt,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> CatalogResult<CourtId> {
        if new.name.trim().is_empty() {
            return Err(CatalogError::MissingName);
        }
        validate_price(new.price_cents)?;
        validate_capacity(new.capacity)?;
        validate_date(new.available_date, today)?;
        let play_times = resolve_play_times(new.duration_hours, new.play_times)?;

        self.last_id += 1;
        let id = self.last_id;
        self.courts.insert(
            id,
            Court {
                id,
                name: new.name,
                address: new.address,
                price_cents: new.price_cents,
                area_sq_m: new.area_sq_m,
                capacity: new.capacity,
                duration_hours: new.duration_hours,
                status: CourtStatus::Available,
                play_times,
                available_date: new.available_date,
                brief: new.brief,
                created_at: now,
            },
        );
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// The slot list is regenerated when the duration changes and no explicit
    /// list accompanies the update. Nothing is written if any field is invalid.
    pub fn update(
        &mut self,
        id: CourtId,
        update: CourtUpdate,
        today: NaiveDate,
    ) -> CatalogResult<&Court> {
        let court = self
            .courts
            .get_mut(&id)
            .ok_or(CatalogError::CourtNotFound(id))?;

        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(CatalogError::MissingName);
        }
        if let Some(price) = update.price_cents {
            validate_price(price)?;
        }
        if let Some(capacity) = update.capacity {
            validate_capacity(capacity)?;
        }
        validate_date(update.available_date, today)?;

        let duration = update.duration_hours.unwrap_or(court.duration_hours);
        let play_times = match (update.play_times, update.duration_hours) {
            (Some(explicit), _) => Some(resolve_play_times(duration, Some(explicit))?),
            (None, Some(hours)) if hours != court.duration_hours => {
                Some(resolve_play_times(hours, None)?)
            }
            _ => None,
        };

        if let Some(name) = update.name {
            court.name = name;
        }
        if let Some(address) = update.address {
            court.address = Some(address);
        }
        if let Some(price) = update.price_cents {
            court.price_cents = price;
        }
        if let Some(area) = update.area_sq_m {
            court.area_sq_m = area;
        }
        if let Some(capacity) = update.capacity {
            court.capacity = capacity;
        }
        if let Some(date) = update.available_date {
            court.available_date = Some(date);
        }
        if let Some(brief) = update.brief {
            court.brief = Some(brief);
        }
        court.duration_hours = duration;
        if let Some(play_times) = play_times {
            court.play_times = play_times;
        }

        Ok(court)
    }

    pub fn remove(&mut self, id: CourtId) -> CatalogResult<Court> {
        self.courts.remove(&id).ok_or(CatalogError::CourtNotFound(id))
    }

    pub fn get(&self, id: CourtId) -> CatalogResult<&Court> {
        self.courts.get(&id).ok_or(CatalogError::CourtNotFound(id))
    }

    pub fn set_status(&mut self, id: CourtId, status: CourtStatus) -> CatalogResult<&Court> {
        let court = self
            .courts
            .get_mut(&id)
            .ok_or(CatalogError::CourtNotFound(id))?;
        court.status = status;
        Ok(court)
    }

    /// Put a slot back on the court's list if it is missing.
    ///
    /// Returns whether the list changed.
    pub fn restore_slot(&mut self, id: CourtId, slot: TimeSlot) -> CatalogResult<bool> {
        let court = self
            .courts
            .get_mut(&id)
            .ok_or(CatalogError::CourtNotFound(id))?;
        if court.offers(&slot) {
            return Ok(false);
        }
        court.play_times.push(slot);
        court.play_times.sort();
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Court> {
        self.courts.values()
    }

    pub fn len(&self) -> usize {
        self.courts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
    }

    pub fn search(&self, query: &CourtQuery) -> Vec<&Court> {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        self.courts
            .values()
            .filter(|court| {
                needle.as_deref().is_none_or(|needle| {
                    court.name.to_lowercase().contains(needle)
                        || court
                            .address
                            .as_deref()
                            .is_some_and(|a| a.to_lowercase().contains(needle))
                })
            })
            .filter(|court| query.max_price_cents.is_none_or(|max| court.price_cents <= max))
            .filter(|court| query.status.is_none_or(|status| court.status == status))
            .collect()
    }
}

fn validate_price(price_cents: i64) -> CatalogResult<()> {
    if price_cents < 0 {
        return Err(CatalogError::InvalidPrice(price_cents));
    }
    Ok(())
}

fn validate_capacity(capacity: u32) -> CatalogResult<()> {
    if capacity == 0 {
        return Err(CatalogError::InvalidCapacity(capacity));
    }
    Ok(())
}

fn validate_date(date: Option<NaiveDate>, today: NaiveDate) -> CatalogResult<()> {
    match date {
        Some(date) if date < today => Err(CatalogError::DateInPast),
        _ => Ok(()),
    }
}

fn resolve_play_times(
    duration_hours: i32,
    explicit: Option<Vec<TimeSlot>>,
) -> CatalogResult<Vec<TimeSlot>> {
    let generated = generate_slots(duration_hours);
    if generated.is_empty() {
        return Err(CatalogError::InvalidDuration(duration_hours));
    }

    let Some(mut slots) = explicit else {
        return Ok(generated);
    };

    if slots.is_empty() {
        return Err(CatalogError::InvalidPlayTimes("no slots given".to_string()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = slots.iter().find(|slot| !seen.insert(**slot)) {
        return Err(CatalogError::InvalidPlayTimes(format!("{dup} listed twice")));
    }
    slots.sort();
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn new_court(name: &str, price_cents: i64, duration_hours: i32) -> NewCourt {
        NewCourt {
            name: name.to_string(),
            address: Some("12 Riverside Road".to_string()),
            price_cents,
            area_sq_m: 260.0,
            capacity: 4,
            duration_hours,
            play_times: None,
            available_date: None,
            brief: None,
        }
    }

    #[test]
    fn test_insert_generates_slots() {
        let mut catalog = CourtCatalog::default();
        let id = catalog
            .insert(new_court("Centre", 10_000, 5), today(), Utc::now())
            .unwrap();
        let court = catalog.get(id).unwrap();
        assert_eq!(court.play_times.len(), 2);
        assert_eq!(court.status, CourtStatus::Available);
    }

    #[test]
    fn test_insert_rejects_invalid_fields() {
        let mut catalog = CourtCatalog::default();
        assert!(matches!(
            catalog.insert(new_court("A", -1, 2), today(), Utc::now()),
            Err(CatalogError::InvalidPrice(-1))
        ));
        assert!(matches!(
            catalog.insert(new_court("A", 100, 0), today(), Utc::now()),
            Err(CatalogError::InvalidDuration(0))
        ));
        assert!(matches!(
            catalog.insert(new_court("  ", 100, 2), today(), Utc::now()),
            Err(CatalogError::MissingName)
        ));

        let mut past = new_court("A", 100, 2);
        past.available_date = NaiveDate::from_ymd_opt(2026, 4, 30);
        assert!(matches!(
            catalog.insert(past, today(), Utc::now()),
            Err(CatalogError::DateInPast)
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_duplicate_explicit_slots_rejected() {
        let mut catalog = CourtCatalog::default();
        let slot = TimeSlot::new(8, 10).unwrap();
        let mut court = new_court("A", 100, 2);
        court.play_times = Some(vec![slot, slot]);
        assert!(matches!(
            catalog.insert(court, today(), Utc::now()),
            Err(CatalogError::InvalidPlayTimes(_))
        ));
    }

    #[test]
    fn test_duration_change_regenerates_slots() {
        let mut catalog = CourtCatalog::default();
        let id = catalog
            .insert(new_court("A", 100, 2), today(), Utc::now())
            .unwrap();
        assert_eq!(catalog.get(id).unwrap().play_times.len(), 7);

        let court = catalog
            .update(
                id,
                CourtUpdate {
                    duration_hours: Some(7),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(court.duration_hours, 7);
        assert_eq!(
            court.play_times,
            vec![TimeSlot::new(8, 15).unwrap(), TimeSlot::new(15, 22).unwrap()]
        );
    }

    #[test]
    fn test_explicit_slots_win_over_duration() {
        let mut catalog = CourtCatalog::default();
        let id = catalog
            .insert(new_court("A", 100, 2), today(), Utc::now())
            .unwrap();
        let evening = TimeSlot::new(18, 20).unwrap();
        let court = catalog
            .update(
                id,
                CourtUpdate {
                    duration_hours: Some(3),
                    play_times: Some(vec![evening]),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(court.play_times, vec![evening]);
    }

    #[test]
    fn test_failed_update_leaves_court_untouched() {
        let mut catalog = CourtCatalog::default();
        let id = catalog
            .insert(new_court("A", 100, 2), today(), Utc::now())
            .unwrap();
        let result = catalog.update(
            id,
            CourtUpdate {
                name: Some("Renamed".to_string()),
                price_cents: Some(-5),
                ..Default::default()
            },
            today(),
        );
        assert!(result.is_err());
        assert_eq!(catalog.get(id).unwrap().name, "A");
    }

    #[test]
    fn test_restore_slot_only_when_missing() {
        let mut catalog = CourtCatalog::default();
        let id = catalog
            .insert(new_court("A", 100, 7), today(), Utc::now())
            .unwrap();
        let offered = TimeSlot::new(8, 15).unwrap();
        let legacy = TimeSlot::new(10, 12).unwrap();
        assert!(!catalog.restore_slot(id, offered).unwrap());
        assert!(catalog.restore_slot(id, legacy).unwrap());
        assert_eq!(
            catalog.get(id).unwrap().play_times,
            vec![offered, legacy, TimeSlot::new(15, 22).unwrap()]
        );
    }

    #[test]
    fn test_search_filters() {
        let mut catalog = CourtCatalog::default();
        catalog
            .insert(new_court("Centre Court", 20_000, 2), today(), Utc::now())
            .unwrap();
        let clay = catalog
            .insert(new_court("Clay Garden", 5_000, 2), today(), Utc::now())
            .unwrap();
        catalog.set_status(clay, CourtStatus::Repairing).unwrap();

        let by_text = catalog.search(&CourtQuery {
            text: Some("centre".to_string()),
            ..Default::default()
        });
        assert_eq!(by_text.len(), 1);

        let cheap = catalog.search(&CourtQuery {
            max_price_cents: Some(10_000),
            ..Default::default()
        });
        assert_eq!(cheap[0].id, clay);

        let open = catalog.search(&CourtQuery {
            status: Some(CourtStatus::Available),
            ..Default::default()
        });
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].name, "Centre Court");

        let by_address = catalog.search(&CourtQuery {
            text: Some("RIVERSIDE".to_string()),
            ..Default::default()
        });
        assert_eq!(by_address.len(), 2);
    }
}
