//! Admin dashboard figures.

use crate::{
    auth::{AccessError, AccessPolicy, Actor, Capability, Role},
    catalog::CourtStatus,
    db::Database,
    wallet::LedgerEntry,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

/// Days covered by the daily series when the caller does not say
pub const DEFAULT_ANALYTICS_DAYS: u32 = 30;
/// Longest window the daily series will cover
pub const MAX_ANALYTICS_DAYS: u32 = 365;

/// Number of events on one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total_users: usize,
    pub admin_users: usize,
    pub regular_users: usize,
    pub total_courts: usize,
    pub available_courts: usize,
    pub repairing_courts: usize,
    pub active_bookings: usize,
    pub system_balance: i64,
    pub total_payments: i64,
    pub total_refunds: i64,
    /// Payments minus refunds
    pub net_revenue: i64,
    /// Length of the daily series below
    pub days: u32,
    /// Accounts created per day, oldest first, ending today
    pub daily_registrations: Vec<DailyCount>,
    /// Bookings still held, by the day they were made, oldest first
    pub daily_bookings: Vec<DailyCount>,
}

/// System balance with the payment and refund history behind it
#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub system_balance: i64,
    /// Newest first
    pub history: Vec<LedgerEntry>,
}

/// Analytics manager
#[derive(Clone)]
pub struct AnalyticsManager {
    db: Database,
}

impl AnalyticsManager {
    /// Create a new analytics manager
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Counts and money totals across the whole store, plus per-day
    /// registrations and bookings for the last `days` days.
    ///
    /// `days` is clamped to `1..=MAX_ANALYTICS_DAYS`.
    pub async fn summary(
        &self,
        actor: &Actor,
        days: u32,
    ) -> Result<AnalyticsSummary, AccessError> {
        AccessPolicy::require(actor, Capability::ViewAnalytics)?;
        let days = days.clamp(1, MAX_ANALYTICS_DAYS);
        let today = Utc::now().date_naive();

        let tables = self.db.read().await;
        let admin_users = tables.accounts.count_by_role(Role::Admin);
        let repairing_courts = tables
            .catalog
            .iter()
            .filter(|court| court.status == CourtStatus::Repairing)
            .count();
        let totals = tables.ledger.totals();

        Ok(AnalyticsSummary {
            total_users: tables.accounts.len(),
            admin_users,
            regular_users: tables.accounts.len() - admin_users,
            total_courts: tables.catalog.len(),
            available_courts: tables.catalog.len() - repairing_courts,
            repairing_courts,
            active_bookings: tables.bookings.len(),
            system_balance: tables.ledger.system_balance(),
            total_payments: totals.payments,
            total_refunds: totals.refunds,
            net_revenue: totals.payments - totals.refunds,
            days,
            daily_registrations: daily_counts(
                today,
                days,
                tables
                    .accounts
                    .users()
                    .into_iter()
                    .map(|user| user.created_at.date_naive()),
            ),
            daily_bookings: daily_counts(
                today,
                days,
                tables
                    .bookings
                    .iter()
                    .map(|booking| booking.created_at.date_naive()),
            ),
        })
    }

    pub async fn revenue_report(&self, actor: &Actor) -> Result<RevenueReport, AccessError> {
        AccessPolicy::require(actor, Capability::ViewRevenue)?;

        let tables = self.db.read().await;
        Ok(RevenueReport {
            system_balance: tables.ledger.system_balance(),
            history: tables
                .ledger
                .revenue_history()
                .into_iter()
                .cloned()
                .collect(),
        })
    }
}

/// Bucket `dates` into the `days` days ending at `today`, oldest first.
/// Dates outside the window are ignored.
fn daily_counts(
    today: NaiveDate,
    days: u32,
    dates: impl Iterator<Item = NaiveDate>,
) -> Vec<DailyCount> {
    let first = today - Duration::days(i64::from(days) - 1);
    let mut series: Vec<DailyCount> = (0..days)
        .map(|offset| DailyCount {
            date: first + Duration::days(i64::from(offset)),
            count: 0,
        })
        .collect();

    for date in dates {
        let slot = usize::try_from((date - first).num_days())
            .ok()
            .and_then(|index| series.get_mut(index));
        if let Some(day) = slot {
            day.count += 1;
        }
    }
    series
}
