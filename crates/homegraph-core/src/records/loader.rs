//! Concurrent, fail-closed loading of a household's records

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{HouseholdRecords, RecordKind};
use super::store::{HouseholdRecordStore, ReadWindow};
use crate::error::{Error, Result};

/// Per-kind read limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCaps {
    pub people: usize,
    pub vendors: usize,
    pub tasks: usize,
    pub preferences: usize,
    pub learned_preferences: usize,
    pub events: usize,
    pub dates: usize,
    pub spending: usize,
    pub locations: usize,
    pub visits: usize,
}

impl Default for RecordCaps {
    fn default() -> Self {
        Self {
            people: 100,
            vendors: 100,
            tasks: 200,
            preferences: 200,
            learned_preferences: 100,
            events: 100,
            dates: 100,
            spending: 200,
            locations: 50,
            visits: 100,
        }
    }
}

impl RecordCaps {
    /// Config keys, one per field
    pub const KEYS: [&'static str; 10] = [
        "people",
        "vendors",
        "tasks",
        "preferences",
        "learned_preferences",
        "events",
        "dates",
        "spending",
        "locations",
        "visits",
    ];

    /// Get a cap by config key
    pub fn get(&self, key: &str) -> Option<usize> {
        Some(match key {
            "people" => self.people,
            "vendors" => self.vendors,
            "tasks" => self.tasks,
            "preferences" => self.preferences,
            "learned_preferences" => self.learned_preferences,
            "events" => self.events,
            "dates" => self.dates,
            "spending" => self.spending,
            "locations" => self.locations,
            "visits" => self.visits,
            _ => return None,
        })
    }

    /// Set a cap by config key, returning false for unknown keys
    pub fn set(&mut self, key: &str, cap: usize) -> bool {
        let slot = match key {
            "people" => &mut self.people,
            "vendors" => &mut self.vendors,
            "tasks" => &mut self.tasks,
            "preferences" => &mut self.preferences,
            "learned_preferences" => &mut self.learned_preferences,
            "events" => &mut self.events,
            "dates" => &mut self.dates,
            "spending" => &mut self.spending,
            "locations" => &mut self.locations,
            "visits" => &mut self.visits,
            _ => return false,
        };
        *slot = cap;
        true
    }

    /// Cap for a record kind
    pub fn for_kind(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Person => self.people,
            RecordKind::Vendor => self.vendors,
            RecordKind::Task => self.tasks,
            RecordKind::Preference => self.preferences,
            RecordKind::LearnedPreference => self.learned_preferences,
            RecordKind::Event => self.events,
            RecordKind::Date => self.dates,
            RecordKind::Spending => self.spending,
            RecordKind::Location => self.locations,
            RecordKind::Visit => self.visits,
        }
    }
}

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Recency window for time-bound kinds, in days
    pub window_days: i64,
    pub caps: RecordCaps,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            window_days: 180,
            caps: RecordCaps::default(),
        }
    }
}

impl LoaderConfig {
    /// Read window for one kind, anchored at `now`
    pub fn window_for(&self, kind: RecordKind, now: DateTime<Utc>) -> ReadWindow {
        let limit = self.caps.for_kind(kind);
        if kind.is_time_bound() {
            ReadWindow::recent(now - Duration::days(self.window_days), limit)
        } else {
            ReadWindow::all(limit)
        }
    }
}

/// Issues the ten list queries concurrently and assembles the result
///
/// Any single failure aborts the whole load: a partial household would
/// produce silently wrong answers.
pub struct RecordLoader<S: HouseholdRecordStore + ?Sized> {
    store: Arc<S>,
    config: LoaderConfig,
}

impl<S: HouseholdRecordStore + ?Sized> RecordLoader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every record kind for a household
    pub async fn load(&self, household_id: &str, now: DateTime<Utc>) -> Result<HouseholdRecords> {
        if household_id.trim().is_empty() {
            return Err(Error::InvalidInput("household id must not be empty".into()));
        }

        let store = self.store.as_ref();
        let people_window = self.config.window_for(RecordKind::Person, now);
        let vendors_window = self.config.window_for(RecordKind::Vendor, now);
        let tasks_window = self.config.window_for(RecordKind::Task, now);
        let preferences_window = self.config.window_for(RecordKind::Preference, now);
        let learned_window = self.config.window_for(RecordKind::LearnedPreference, now);
        let events_window = self.config.window_for(RecordKind::Event, now);
        let dates_window = self.config.window_for(RecordKind::Date, now);
        let spending_window = self.config.window_for(RecordKind::Spending, now);
        let locations_window = self.config.window_for(RecordKind::Location, now);
        let visits_window = self.config.window_for(RecordKind::Visit, now);

        let (
            people,
            vendors,
            tasks,
            preferences,
            learned_preferences,
            events,
            dates,
            spending,
            locations,
            visits,
        ) = tokio::try_join!(
            tagged("people", store.list_people(household_id, &people_window)),
            tagged("vendors", store.list_vendors(household_id, &vendors_window)),
            tagged("tasks", store.list_tasks(household_id, &tasks_window)),
            tagged(
                "preferences",
                store.list_preferences(household_id, &preferences_window)
            ),
            tagged(
                "learned_preferences",
                store.list_learned_preferences(household_id, &learned_window)
            ),
            tagged("events", store.list_events(household_id, &events_window)),
            tagged(
                "important_dates",
                store.list_important_dates(household_id, &dates_window)
            ),
            tagged("spending", store.list_spending(household_id, &spending_window)),
            tagged(
                "locations",
                store.list_locations(household_id, &locations_window)
            ),
            tagged("visits", store.list_visits(household_id, &visits_window)),
        )?;

        let records = HouseholdRecords {
            people,
            vendors,
            tasks,
            preferences,
            learned_preferences,
            events,
            dates,
            spending,
            locations,
            visits,
        };

        for kind in RecordKind::all() {
            debug!(household = household_id, kind = %kind, count = records.count(*kind), "Loaded records");
        }
        info!(household = household_id, total = records.total(), "Household records loaded");

        Ok(records)
    }
}

/// Attach the entity name to a store failure
async fn tagged<T>(
    entity: &'static str,
    query: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    query.await.map_err(|err| match err {
        Error::DependencyUnavailable { .. } => err,
        other => Error::dependency(entity, other),
    })
}
