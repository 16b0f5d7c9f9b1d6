//! Court catalog manager.

use super::{
    errors::{CatalogError, CatalogResult},
    models::{Court, CourtId, CourtQuery, CourtStatus, CourtUpdate, NewCourt},
};
use crate::{
    auth::{AccessPolicy, Actor, Capability},
    db::Database,
};
use chrono::Utc;
use log::info;

/// Catalog manager
#[derive(Clone)]
pub struct CatalogManager {
    db: Database,
}

impl CatalogManager {
    /// Create a new catalog manager
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add a court to the catalog
    ///
    /// # Errors
    ///
    /// * `CatalogError::Access` - Actor cannot manage courts
    /// * `CatalogError::InvalidPrice` / `InvalidCapacity` / `InvalidDuration` - Bad fields
    pub async fn add_court(&self, actor: &Actor, new: NewCourt) -> CatalogResult<Court> {
        AccessPolicy::require(actor, Capability::ManageCourts)?;

        let now = Utc::now();
        let mut tables = self.db.write().await;
        let id = tables.catalog.insert(new, now.date_naive(), now)?;
        let court = tables.catalog.get(id)?.clone();

        info!(
            "Court {} ({}) added with {} slot(s)",
            court.id,
            court.name,
            court.play_times.len()
        );
        Ok(court)
    }

    /// Edit a court's details
    pub async fn update_court(
        &self,
        actor: &Actor,
        court_id: CourtId,
        update: CourtUpdate,
    ) -> CatalogResult<Court> {
        AccessPolicy::require(actor, Capability::ManageCourts)?;

        let today = Utc::now().date_naive();
        let mut tables = self.db.write().await;
        let court = tables.catalog.update(court_id, update, today)?.clone();

        info!("Court {court_id} updated");
        Ok(court)
    }

    /// Remove a court along with its reports and reviews
    ///
    /// # Errors
    ///
    /// * `CatalogError::CourtInUse` - The court still has active bookings
    pub async fn delete_court(&self, actor: &Actor, court_id: CourtId) -> CatalogResult<Court> {
        AccessPolicy::require(actor, Capability::ManageCourts)?;

        let mut tables = self.db.write().await;
        tables.catalog.get(court_id)?;
        if tables.bookings.has_active_on(court_id) {
            return Err(CatalogError::CourtInUse(court_id));
        }

        let court = tables.catalog.remove(court_id)?;
        tables.feedback.forget_court(court_id);

        info!("Court {court_id} deleted");
        Ok(court)
    }

    /// Switch a court between Available and Repairing
    pub async fn set_status(
        &self,
        actor: &Actor,
        court_id: CourtId,
        status: CourtStatus,
    ) -> CatalogResult<Court> {
        AccessPolicy::require(actor, Capability::ManageCourts)?;

        let mut tables = self.db.write().await;
        let court = tables.catalog.set_status(court_id, status)?.clone();

        info!("Court {court_id} is now {status}");
        Ok(court)
    }

    pub async fn get_court(&self, court_id: CourtId) -> CatalogResult<Court> {
        let tables = self.db.read().await;
        Ok(tables.catalog.get(court_id)?.clone())
    }

    pub async fn list_courts(&self) -> Vec<Court> {
        let tables = self.db.read().await;
        tables.catalog.iter().cloned().collect()
    }

    pub async fn search_courts(&self, query: &CourtQuery) -> Vec<Court> {
        let tables = self.db.read().await;
        tables.catalog.search(query).into_iter().cloned().collect()
    }
}
