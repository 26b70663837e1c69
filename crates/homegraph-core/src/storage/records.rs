//! SQLite implementation of the household record store

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::records::{
    CalendarEvent, HouseholdRecord, HouseholdRecordStore, HouseholdRecords, ImportantDate,
    LearnedPreference, Location, Person, Preference, ReadWindow, RecordKind, ServiceVisit,
    SpendingItem, Task, Vendor,
};

use super::database::Database;

/// Table backing a record kind
pub fn table_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Person => "people",
        RecordKind::Vendor => "vendors",
        RecordKind::Task => "tasks",
        RecordKind::Preference => "preferences",
        RecordKind::LearnedPreference => "learned_preferences",
        RecordKind::Event => "calendar_events",
        RecordKind::Date => "important_dates",
        RecordKind::Spending => "spending_items",
        RecordKind::Location => "locations",
        RecordKind::Visit => "service_visits",
    }
}

/// Timestamps are stored fixed-width so that text comparison is time order
fn stored_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Per-kind counts written by an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub counts: Vec<(RecordKind, usize)>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Household records kept in SQLite, one table per record kind
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }

    /// Upsert every record in `records` for a household
    ///
    /// Records without an id are given a fresh one.
    pub async fn import(
        &self,
        household_id: &str,
        records: &HouseholdRecords,
    ) -> Result<ImportSummary> {
        if household_id.trim().is_empty() {
            return Err(Error::InvalidInput("household id must not be empty".into()));
        }

        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        macro_rules! import_all {
            ($list:expr) => {{
                let mut written = 0;
                for record in $list {
                    upsert(&mut tx, household_id, record).await?;
                    written += 1;
                }
                written
            }};
        }

        summary.counts.push((RecordKind::Person, import_all!(&records.people)));
        summary.counts.push((RecordKind::Vendor, import_all!(&records.vendors)));
        summary.counts.push((RecordKind::Task, import_all!(&records.tasks)));
        summary
            .counts
            .push((RecordKind::Preference, import_all!(&records.preferences)));
        summary.counts.push((
            RecordKind::LearnedPreference,
            import_all!(&records.learned_preferences),
        ));
        summary.counts.push((RecordKind::Event, import_all!(&records.events)));
        summary.counts.push((RecordKind::Date, import_all!(&records.dates)));
        summary
            .counts
            .push((RecordKind::Spending, import_all!(&records.spending)));
        summary
            .counts
            .push((RecordKind::Location, import_all!(&records.locations)));
        summary.counts.push((RecordKind::Visit, import_all!(&records.visits)));

        tx.commit().await?;
        info!(household = household_id, total = summary.total(), "Imported household records");
        Ok(summary)
    }

    async fn select<T>(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<T>>
    where
        T: HouseholdRecord + DeserializeOwned,
    {
        let table = table_for(T::KIND);
        let query = format!(
            "SELECT record FROM {table} \
             WHERE household_id = ? AND (? IS NULL OR created_at >= ?) \
             ORDER BY created_at DESC, rowid ASC LIMIT ?"
        );
        let since = window.since.map(stored_timestamp);
        let limit = i64::try_from(window.limit).unwrap_or(i64::MAX);

        let rows: Vec<(String,)> = sqlx::query_as(&query)
            .bind(household_id)
            .bind(since.clone())
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let records = rows
            .into_iter()
            .map(|(json,)| serde_json::from_str::<T>(&json))
            .collect::<std::result::Result<Vec<T>, _>>()?;

        debug!(kind = %T::KIND, count = records.len(), "Read records");
        Ok(records)
    }
}

async fn upsert<T: HouseholdRecord>(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    household_id: &str,
    record: &T,
) -> Result<()> {
    let mut value = serde_json::to_value(record)?;
    let id = match record.id().trim() {
        "" => {
            let fresh = Uuid::new_v4().to_string();
            if let Some(object) = value.as_object_mut() {
                object.insert("id".into(), fresh.clone().into());
            }
            fresh
        }
        id => id.to_string(),
    };

    let query = format!(
        "INSERT INTO {} (household_id, id, created_at, record) VALUES (?, ?, ?, ?) \
         ON CONFLICT(household_id, id) DO UPDATE SET \
             created_at = excluded.created_at, \
             record = excluded.record",
        table_for(T::KIND)
    );

    sqlx::query(&query)
        .bind(household_id)
        .bind(&id)
        .bind(stored_timestamp(record.created_at()))
        .bind(value.to_string())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl HouseholdRecordStore for SqliteRecordStore {
    async fn list_people(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Person>> {
        self.select(household_id, window).await
    }

    async fn list_vendors(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Vendor>> {
        self.select(household_id, window).await
    }

    async fn list_tasks(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Task>> {
        self.select(household_id, window).await
    }

    async fn list_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Preference>> {
        self.select(household_id, window).await
    }

    async fn list_learned_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<LearnedPreference>> {
        self.select(household_id, window).await
    }

    async fn list_events(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<CalendarEvent>> {
        self.select(household_id, window).await
    }

    async fn list_important_dates(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ImportantDate>> {
        self.select(household_id, window).await
    }

    async fn list_spending(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<SpendingItem>> {
        self.select(household_id, window).await
    }

    async fn list_locations(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Location>> {
        self.select(household_id, window).await
    }

    async fn list_visits(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ServiceVisit>> {
        self.select(household_id, window).await
    }
}
