//! Typed household records as read from the record store
//!
//! Each record type serializes to the attribute map of its graph node, so
//! field order here is the attribute order seen by the context serializer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::NodeType;

/// Source table a record was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Person,
    Vendor,
    Task,
    Preference,
    LearnedPreference,
    Event,
    Date,
    Spending,
    Location,
    Visit,
}

impl RecordKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Vendor => "vendor",
            Self::Task => "task",
            Self::Preference => "preference",
            Self::LearnedPreference => "learned_preference",
            Self::Event => "event",
            Self::Date => "date",
            Self::Spending => "spending",
            Self::Location => "location",
            Self::Visit => "visit",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "person" | "people" => Some(Self::Person),
            "vendor" | "vendors" => Some(Self::Vendor),
            "task" | "tasks" => Some(Self::Task),
            "preference" | "preferences" => Some(Self::Preference),
            "learned_preference" | "learned_preferences" => Some(Self::LearnedPreference),
            "event" | "events" => Some(Self::Event),
            "date" | "dates" | "important_date" => Some(Self::Date),
            "spending" | "spending_item" => Some(Self::Spending),
            "location" | "locations" => Some(Self::Location),
            "visit" | "visits" | "service_visit" => Some(Self::Visit),
            _ => None,
        }
    }

    /// Graph node type records of this kind become
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Person => NodeType::Person,
            Self::Vendor => NodeType::Vendor,
            Self::Task => NodeType::Task,
            Self::Preference | Self::LearnedPreference => NodeType::Preference,
            Self::Event | Self::Visit => NodeType::Event,
            Self::Date => NodeType::Date,
            Self::Spending => NodeType::Spending,
            Self::Location => NodeType::Location,
        }
    }

    /// Whether reads of this kind are restricted to the recency window
    pub fn is_time_bound(&self) -> bool {
        matches!(
            self,
            Self::Task | Self::LearnedPreference | Self::Event | Self::Spending | Self::Visit
        )
    }

    /// Get all record kinds, in graph order
    pub fn all() -> &'static [RecordKind] {
        &[
            Self::Person,
            Self::Vendor,
            Self::Task,
            Self::Preference,
            Self::LearnedPreference,
            Self::Event,
            Self::Visit,
            Self::Spending,
            Self::Location,
            Self::Date,
        ]
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common behaviour of every record type
pub trait HouseholdRecord: Serialize + Clone + Send + Sync {
    const KIND: RecordKind;

    /// Source record id
    fn id(&self) -> &str;

    /// Display label for the graph node
    fn label(&self) -> String;

    /// Timestamp used for recency ordering and windowing
    fn created_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub id: String,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub is_no_go: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPreference {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantDate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingItem {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceVisit {
    pub id: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Render a dollar amount the way labels show it (`$1,250`, `$12.50`)
pub fn format_currency(amount: f64) -> String {
    format_cents((amount * 100.0).round() as i64)
}

/// Render an amount held in cents
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, fraction)
    }
}

impl HouseholdRecord for Person {
    const KIND: RecordKind = RecordKind::Person;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for Vendor {
    const KIND: RecordKind = RecordKind::Vendor;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for Task {
    const KIND: RecordKind = RecordKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for Preference {
    const KIND: RecordKind = RecordKind::Preference;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for LearnedPreference {
    const KIND: RecordKind = RecordKind::LearnedPreference;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for CalendarEvent {
    const KIND: RecordKind = RecordKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for ImportantDate {
    const KIND: RecordKind = RecordKind::Date;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for SpendingItem {
    const KIND: RecordKind = RecordKind::Spending;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        if let Some(description) = non_empty(&self.description) {
            return description.to_string();
        }
        match non_empty(&self.vendor) {
            Some(vendor) => format!("{} {}", vendor, format_currency(self.amount)),
            None => format_currency(self.amount),
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for Location {
    const KIND: RecordKind = RecordKind::Location;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl HouseholdRecord for ServiceVisit {
    const KIND: RecordKind = RecordKind::Visit;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        match non_empty(&self.service) {
            Some(service) => format!("{} visit", service),
            None => "Service visit".to_string(),
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Everything loaded for one household, one list per record kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdRecords {
    pub people: Vec<Person>,
    pub vendors: Vec<Vendor>,
    pub tasks: Vec<Task>,
    pub preferences: Vec<Preference>,
    pub learned_preferences: Vec<LearnedPreference>,
    pub events: Vec<CalendarEvent>,
    pub dates: Vec<ImportantDate>,
    pub spending: Vec<SpendingItem>,
    pub locations: Vec<Location>,
    pub visits: Vec<ServiceVisit>,
}

impl HouseholdRecords {
    /// Number of records of one kind
    pub fn count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Person => self.people.len(),
            RecordKind::Vendor => self.vendors.len(),
            RecordKind::Task => self.tasks.len(),
            RecordKind::Preference => self.preferences.len(),
            RecordKind::LearnedPreference => self.learned_preferences.len(),
            RecordKind::Event => self.events.len(),
            RecordKind::Date => self.dates.len(),
            RecordKind::Spending => self.spending.len(),
            RecordKind::Location => self.locations.len(),
            RecordKind::Visit => self.visits.len(),
        }
    }

    /// Total number of records across all kinds
    pub fn total(&self) -> usize {
        RecordKind::all().iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        format!("2026-03-{:02}T12:00:00Z", day).parse().unwrap()
    }

    #[test]
    fn test_record_kind_node_types() {
        assert_eq!(RecordKind::LearnedPreference.node_type(), NodeType::Preference);
        assert_eq!(RecordKind::Visit.node_type(), NodeType::Event);
        assert_eq!(RecordKind::Date.node_type(), NodeType::Date);
        assert_eq!(RecordKind::all().len(), 10);
    }

    #[test]
    fn test_record_kind_parsing() {
        assert_eq!(RecordKind::parse("people"), Some(RecordKind::Person));
        assert_eq!(RecordKind::parse("LEARNED_PREFERENCES"), Some(RecordKind::LearnedPreference));
        assert_eq!(RecordKind::parse("service_visit"), Some(RecordKind::Visit));
        assert_eq!(RecordKind::parse("pets"), None);
    }

    #[test]
    fn test_time_bound_kinds() {
        assert!(RecordKind::Task.is_time_bound());
        assert!(RecordKind::Spending.is_time_bound());
        assert!(!RecordKind::Person.is_time_bound());
        assert!(!RecordKind::Date.is_time_bound());
    }

    #[test]
    fn test_spending_label_fallbacks() {
        let mut item = SpendingItem {
            id: "s1".into(),
            description: Some("Drain repair".into()),
            amount: 1250.0,
            vendor: Some("ABC Plumbing".into()),
            category: None,
            date: None,
            task_id: None,
            created_at: at(1),
        };
        assert_eq!(item.label(), "Drain repair");

        item.description = Some("  ".into());
        assert_eq!(item.label(), "ABC Plumbing $1,250");

        item.vendor = None;
        item.amount = 12.5;
        assert_eq!(item.label(), "$12.50");
    }

    #[test]
    fn test_visit_label() {
        let visit = ServiceVisit {
            id: "v1".into(),
            service: Some("Deep clean".into()),
            date: None,
            status: None,
            notes: None,
            created_at: at(2),
        };
        assert_eq!(visit.label(), "Deep clean visit");

        let anonymous = ServiceVisit { service: None, ..visit };
        assert_eq!(anonymous.label(), "Service visit");
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(60_000), "$600");
        assert_eq!(format_cents(50_001), "$500.01");
        assert_eq!(format_cents(123_456_700), "$1,234,567");
        assert_eq!(format_cents(-1_050), "-$10.50");
        assert_eq!(format_cents(0), "$0");
    }

    #[test]
    fn test_household_records_counts() {
        let mut records = HouseholdRecords::default();
        assert!(records.is_empty());

        records.people.push(Person {
            id: "p1".into(),
            name: "Jane".into(),
            role: None,
            email: None,
            phone: None,
            birthday: None,
            allergies: vec![],
            dietary_restrictions: vec![],
            notes: None,
            created_at: at(3),
        });

        assert_eq!(records.count(RecordKind::Person), 1);
        assert_eq!(records.total(), 1);
    }

    #[test]
    fn test_records_deserialize_with_missing_sections() {
        let json = r#"{"vendors":[{"id":"v1","name":"ABC Plumbing","created_at":"2026-01-01T00:00:00Z"}]}"#;
        let records: HouseholdRecords = serde_json::from_str(json).unwrap();
        assert_eq!(records.vendors.len(), 1);
        assert!(records.people.is_empty());
        assert_eq!(records.vendors[0].category, None);
    }
}
