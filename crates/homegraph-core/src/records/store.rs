//! Read-only record store seam
//!
//! The graph never talks to a database directly. Anything that can answer
//! these ten list queries for a household can feed the loader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{
    CalendarEvent, ImportantDate, LearnedPreference, Location, Person, Preference, ServiceVisit,
    SpendingItem, Task, Vendor,
};
use crate::error::Result;

/// Bounds for a single list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadWindow {
    /// Only records created at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of records, most recent first
    pub limit: usize,
}

impl ReadWindow {
    /// Unbounded in time, capped in count
    pub fn all(limit: usize) -> Self {
        Self { since: None, limit }
    }

    /// Records created since `since`, capped in count
    pub fn recent(since: DateTime<Utc>, limit: usize) -> Self {
        Self {
            since: Some(since),
            limit,
        }
    }

    /// Whether a record created at `created_at` falls inside the window
    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        self.since.is_none_or(|since| created_at >= since)
    }
}

/// Source of household records
///
/// Implementations return records ordered by `created_at` descending, with
/// at most `window.limit` entries and none older than `window.since`.
#[async_trait]
pub trait HouseholdRecordStore: Send + Sync {
    async fn list_people(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Person>>;

    async fn list_vendors(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Vendor>>;

    async fn list_tasks(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Task>>;

    async fn list_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Preference>>;

    async fn list_learned_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<LearnedPreference>>;

    async fn list_events(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<CalendarEvent>>;

    async fn list_important_dates(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ImportantDate>>;

    async fn list_spending(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<SpendingItem>>;

    async fn list_locations(&self, household_id: &str, window: &ReadWindow)
    -> Result<Vec<Location>>;

    async fn list_visits(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ServiceVisit>>;
}
