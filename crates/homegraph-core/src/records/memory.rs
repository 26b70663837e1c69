//! In-memory record store
//!
//! Used by tests and by the CLI when a household is read straight from a
//! JSON export instead of the database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::model::{
    CalendarEvent, HouseholdRecord, HouseholdRecords, ImportantDate, LearnedPreference, Location,
    Person, Preference, ServiceVisit, SpendingItem, Task, Vendor,
};
use super::store::{HouseholdRecordStore, ReadWindow};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    households: RwLock<HashMap<String, HouseholdRecords>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a single household already inserted
    pub fn with_household(household_id: impl Into<String>, records: HouseholdRecords) -> Self {
        let store = Self::new();
        if let Ok(mut households) = store.households.write() {
            households.insert(household_id.into(), records);
        }
        store
    }

    /// Replace a household's records
    pub fn insert(&self, household_id: impl Into<String>, records: HouseholdRecords) -> Result<()> {
        let mut households = self
            .households
            .write()
            .map_err(|_| Error::Other("record store lock poisoned".into()))?;
        households.insert(household_id.into(), records);
        Ok(())
    }

    fn select<T, F>(&self, household_id: &str, window: &ReadWindow, pick: F) -> Result<Vec<T>>
    where
        T: HouseholdRecord,
        F: FnOnce(&HouseholdRecords) -> &Vec<T>,
    {
        let households = self
            .households
            .read()
            .map_err(|_| Error::Other("record store lock poisoned".into()))?;

        let Some(records) = households.get(household_id) else {
            return Ok(Vec::new());
        };

        let mut selected: Vec<T> = pick(records)
            .iter()
            .filter(|record| window.admits(record.created_at()))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal timestamps
        selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        selected.truncate(window.limit);
        Ok(selected)
    }
}

#[async_trait]
impl HouseholdRecordStore for MemoryRecordStore {
    async fn list_people(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Person>> {
        self.select(household_id, window, |r| &r.people)
    }

    async fn list_vendors(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Vendor>> {
        self.select(household_id, window, |r| &r.vendors)
    }

    async fn list_tasks(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Task>> {
        self.select(household_id, window, |r| &r.tasks)
    }

    async fn list_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Preference>> {
        self.select(household_id, window, |r| &r.preferences)
    }

    async fn list_learned_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<LearnedPreference>> {
        self.select(household_id, window, |r| &r.learned_preferences)
    }

    async fn list_events(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<CalendarEvent>> {
        self.select(household_id, window, |r| &r.events)
    }

    async fn list_important_dates(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ImportantDate>> {
        self.select(household_id, window, |r| &r.dates)
    }

    async fn list_spending(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<SpendingItem>> {
        self.select(household_id, window, |r| &r.spending)
    }

    async fn list_locations(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Location>> {
        self.select(household_id, window, |r| &r.locations)
    }

    async fn list_visits(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ServiceVisit>> {
        self.select(household_id, window, |r| &r.visits)
    }
}
