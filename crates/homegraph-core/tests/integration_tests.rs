//! Homegraph Core Integration Tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use homegraph_core::{
    Error, HouseholdEngine, Result,
    answer::{AnswerEngine, fallback::NOTHING_FOUND},
    graph::{GraphBuilder, Relation},
    llm::TextCompleter,
    records::{
        CalendarEvent, HouseholdRecordStore, HouseholdRecords, ImportantDate, LearnedPreference,
        Location, MemoryRecordStore, Person, Preference, ReadWindow, RecordKind, ServiceVisit,
        SpendingItem, Task, Vendor,
    },
    storage::{Database, SqliteRecordStore},
};
use tempfile::TempDir;

const HOUSEHOLD: &str = "household-1";

fn now() -> DateTime<Utc> {
    "2026-10-16T12:00:00Z".parse().unwrap()
}

fn at(raw: &str) -> DateTime<Utc> {
    format!("{raw}T09:00:00Z").parse().unwrap()
}

fn vendor(id: &str, name: &str, category: &str, phone: Option<&str>) -> Vendor {
    Vendor {
        id: id.into(),
        name: name.into(),
        category: Some(category.into()),
        phone: phone.map(Into::into),
        email: None,
        rating: None,
        notes: None,
        created_at: at("2026-01-10"),
    }
}

fn spend(id: &str, description: &str, amount: f64, vendor: &str, date: &str) -> SpendingItem {
    SpendingItem {
        id: id.into(),
        description: Some(description.into()),
        amount,
        vendor: Some(vendor.into()),
        category: Some("Home".into()),
        date: Some(date.into()),
        task_id: None,
        created_at: at(date),
    }
}

fn person(id: &str, name: &str) -> Person {
    Person {
        id: id.into(),
        name: name.into(),
        role: Some("Parent".into()),
        email: None,
        phone: None,
        birthday: None,
        allergies: vec![],
        dietary_restrictions: vec![],
        notes: None,
        created_at: at("2025-02-01"),
    }
}

fn plumbing_household() -> HouseholdRecords {
    HouseholdRecords {
        vendors: vec![vendor("v1", "ABC Plumbing", "Plumber", Some("555-1212"))],
        spending: vec![
            spend("s1", "Pipe repair", 200.0, "ABC Plumbing", "2026-08-01"),
            spend("s2", "Water heater flush", 200.0, "ABC Plumbing", "2026-09-01"),
            spend("s3", "Drain snaking", 200.0, "abc plumbing", "2026-10-01"),
        ],
        ..Default::default()
    }
}

/// One record of every kind, loosely connected
fn full_household() -> HouseholdRecords {
    HouseholdRecords {
        people: vec![person("p1", "Jane")],
        vendors: vec![
            vendor("v1", "ABC Plumbing", "Plumber", Some("555-1212")),
            vendor("v2", "Sparkle Maids", "House Cleaning", None),
        ],
        tasks: vec![Task {
            id: "t1".into(),
            title: "Call ABC Plumbing about the leak".into(),
            description: None,
            category: Some("Repairs".into()),
            status: Some("open".into()),
            priority: None,
            due_at: None,
            scheduled_at: Some("2026-10-20".into()),
            completed_at: None,
            created_at: at("2026-10-01"),
        }],
        preferences: vec![Preference {
            id: "pr1".into(),
            person_id: Some("p1".into()),
            category: Some("Services".into()),
            key: "cleaner".into(),
            value: "Prefers Sparkle Maids".into(),
            is_no_go: false,
            created_at: at("2026-03-01"),
        }],
        learned_preferences: vec![LearnedPreference {
            id: "lp1".into(),
            category: Some("Food".into()),
            key: "dinner".into(),
            value: "Pizza on Fridays".into(),
            confidence: Some(0.8),
            source: None,
            created_at: at("2026-09-01"),
        }],
        events: vec![CalendarEvent {
            id: "e1".into(),
            title: "Soccer practice".into(),
            description: None,
            start_at: Some("2026-10-18T16:00:00Z".into()),
            end_at: None,
            location: Some("Riverside Park".into()),
            created_at: at("2026-10-02"),
        }],
        dates: vec![ImportantDate {
            id: "d1".into(),
            title: "Anniversary".into(),
            date: Some("2026-10-26".into()),
            person_id: Some("p1".into()),
            category: Some("anniversary".into()),
            notes: None,
            created_at: at("2024-05-01"),
        }],
        spending: vec![spend("s1", "Leak fix", 150.0, "ABC Plumbing", "2026-10-05")],
        locations: vec![Location {
            id: "l1".into(),
            name: "Riverside Park".into(),
            address: None,
            category: Some("Park".into()),
            notes: None,
            created_at: at("2025-01-01"),
        }],
        visits: vec![ServiceVisit {
            id: "sv1".into(),
            service: Some("Deep clean".into()),
            date: Some("2026-10-10".into()),
            status: Some("completed".into()),
            notes: None,
            created_at: at("2026-10-10"),
        }],
    }
}

fn engine_for(records: HouseholdRecords) -> HouseholdEngine<MemoryRecordStore> {
    HouseholdEngine::new(Arc::new(MemoryRecordStore::with_household(HOUSEHOLD, records)))
}

/// Completer returning a fixed reply and recording what it was sent
struct ScriptedCompleter {
    reply: fn() -> Result<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    fn new(reply: fn() -> Result<String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(
        &self,
        _system: &str,
        user: &str,
        _max_tokens: usize,
        _temperature: f32,
    ) -> Result<String> {
        self.prompts.lock().unwrap().push(user.to_string());
        (self.reply)()
    }
}

/// Memory store that fails reads of one record kind
struct FlakyStore {
    inner: MemoryRecordStore,
    failing: RecordKind,
}

impl FlakyStore {
    fn check(&self, kind: RecordKind) -> Result<()> {
        if kind == self.failing {
            return Err(Error::Other("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HouseholdRecordStore for FlakyStore {
    async fn list_people(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Person>> {
        self.check(RecordKind::Person)?;
        self.inner.list_people(household_id, window).await
    }

    async fn list_vendors(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Vendor>> {
        self.check(RecordKind::Vendor)?;
        self.inner.list_vendors(household_id, window).await
    }

    async fn list_tasks(&self, household_id: &str, window: &ReadWindow) -> Result<Vec<Task>> {
        self.check(RecordKind::Task)?;
        self.inner.list_tasks(household_id, window).await
    }

    async fn list_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Preference>> {
        self.check(RecordKind::Preference)?;
        self.inner.list_preferences(household_id, window).await
    }

    async fn list_learned_preferences(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<LearnedPreference>> {
        self.check(RecordKind::LearnedPreference)?;
        self.inner.list_learned_preferences(household_id, window).await
    }

    async fn list_events(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<CalendarEvent>> {
        self.check(RecordKind::Event)?;
        self.inner.list_events(household_id, window).await
    }

    async fn list_important_dates(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ImportantDate>> {
        self.check(RecordKind::Date)?;
        self.inner.list_important_dates(household_id, window).await
    }

    async fn list_spending(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<SpendingItem>> {
        self.check(RecordKind::Spending)?;
        self.inner.list_spending(household_id, window).await
    }

    async fn list_locations(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<Location>> {
        self.check(RecordKind::Location)?;
        self.inner.list_locations(household_id, window).await
    }

    async fn list_visits(
        &self,
        household_id: &str,
        window: &ReadWindow,
    ) -> Result<Vec<ServiceVisit>> {
        self.check(RecordKind::Visit)?;
        self.inner.list_visits(household_id, window).await
    }
}

#[tokio::test]
async fn test_node_count_matches_loaded_records() {
    let records = full_household();
    let engine = engine_for(records.clone());
    let graph = engine.build_graph_at(HOUSEHOLD, now()).await.unwrap();

    assert_eq!(graph.nodes.len(), records.total());
    assert_eq!(graph.tally().node_count(), graph.nodes.len());
    assert_eq!(graph.tally().relationships, graph.edges.len());
    assert_eq!(graph.summary, graph.tally().to_string());
}

#[tokio::test]
async fn test_full_household_edges() {
    let engine = engine_for(full_household());
    let graph = engine.build_graph_at(HOUSEHOLD, now()).await.unwrap();

    let relations: Vec<Relation> = graph.edges.iter().map(|e| e.relation).collect();
    for expected in [
        Relation::BelongsTo,
        Relation::PaidTo,
        Relation::AtLocation,
        Relation::PerformedService,
        Relation::InvolvesVendor,
        Relation::ReferencesVendor,
    ] {
        assert!(relations.contains(&expected), "missing {expected:?}");
    }
}

#[tokio::test]
async fn test_edge_inference_is_deterministic() {
    let records = full_household();
    let builder = GraphBuilder::new();

    let first = builder.build(&records);
    let second = builder.build(&records);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_plumber_scenario_without_model() {
    let engine = engine_for(HouseholdRecords {
        vendors: vec![vendor("v1", "ABC Plumbing", "Plumber", Some("555-1212"))],
        ..Default::default()
    });

    let result = engine
        .ask_at(HOUSEHOLD, "who is our plumber?", now())
        .await
        .unwrap();
    assert_eq!(result.answer, "ABC Plumbing (Plumber) phone: 555-1212");
}

#[tokio::test]
async fn test_vendor_spend_connection() {
    let engine = engine_for(plumbing_household());
    let result = engine
        .ask_at(HOUSEHOLD, "anything new?", now())
        .await
        .unwrap();

    assert_eq!(
        result.connections,
        vec!["You've spent $600 with ABC Plumbing in the last 6 months".to_string()]
    );
}

#[tokio::test]
async fn test_vendor_spend_threshold_boundary() {
    let exactly = HouseholdRecords {
        vendors: vec![vendor("v1", "ABC Plumbing", "Plumber", None)],
        spending: vec![
            spend("s1", "Pipe repair", 250.0, "ABC Plumbing", "2026-09-01"),
            spend("s2", "Valve swap", 250.0, "ABC Plumbing", "2026-09-02"),
        ],
        ..Default::default()
    };
    let mut over = exactly.clone();
    over.spending[1].amount = 250.01;

    let at_threshold = engine_for(exactly)
        .ask_at(HOUSEHOLD, "status", now())
        .await
        .unwrap();
    assert!(at_threshold.connections.is_empty());

    let above = engine_for(over)
        .ask_at(HOUSEHOLD, "status", now())
        .await
        .unwrap();
    assert_eq!(
        above.connections,
        vec!["You've spent $500.01 with ABC Plumbing in the last 6 months".to_string()]
    );
}

#[tokio::test]
async fn test_upcoming_anniversary_connection() {
    let engine = engine_for(full_household());
    let result = engine
        .ask_at(HOUSEHOLD, "what should I know?", now())
        .await
        .unwrap();

    assert!(
        result
            .connections
            .contains(&"Jane's Anniversary is in 10 days (Oct 26)".to_string()),
        "connections were {:?}",
        result.connections
    );
}

#[tokio::test]
async fn test_monetary_wins_over_identity() {
    let engine = engine_for(plumbing_household());
    let result = engine
        .ask_at(HOUSEHOLD, "who cost plumbing?", now())
        .await
        .unwrap();

    assert_eq!(
        result.answer,
        "You've spent $600 across 3 matching expenses. The most recent was Drain snaking."
    );
}

#[tokio::test]
async fn test_empty_graph_answers_nothing_found() {
    let engine = engine_for(HouseholdRecords::default());
    let result = engine
        .ask_at(HOUSEHOLD, "tell me about the garden", now())
        .await
        .unwrap();

    assert_eq!(result.answer, NOTHING_FOUND);
    assert!(result.connections.is_empty());
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn test_sources_capped_at_ten() {
    let records = HouseholdRecords {
        vendors: (0..15)
            .map(|i| vendor(&format!("v{i}"), &format!("Roofer {i}"), "Roofing", None))
            .collect(),
        ..Default::default()
    };
    let engine = engine_for(records);
    let result = engine
        .ask_at(HOUSEHOLD, "roofing", now())
        .await
        .unwrap();

    assert_eq!(result.sources.len(), 10);
}

#[tokio::test]
async fn test_store_failure_is_fail_closed() {
    let store = Arc::new(FlakyStore {
        inner: MemoryRecordStore::with_household(HOUSEHOLD, full_household()),
        failing: RecordKind::Spending,
    });
    let engine = HouseholdEngine::new(store);

    let err = engine
        .ask_at(HOUSEHOLD, "how much have we spent?", now())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "E100");
    assert!(err.is_fatal());
    match err {
        Error::DependencyUnavailable { entity, .. } => assert_eq!(entity, "spending"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_model_answer_is_returned() {
    let completer = ScriptedCompleter::new(|| Ok("  Call ABC Plumbing at 555-1212.  ".into()));
    let engine = engine_for(plumbing_household()).with_completer(completer.clone());
    assert!(engine.has_model());

    let result = engine
        .ask_at(HOUSEHOLD, "who is our plumber?", now())
        .await
        .unwrap();

    assert_eq!(result.answer, "Call ABC Plumbing at 555-1212.");
    assert_eq!(completer.calls(), 1);

    let prompt = completer.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Household summary:"));
    assert!(prompt.ends_with("Question: who is our plumber?"));
}

#[tokio::test]
async fn test_model_failure_falls_back() {
    let completer = ScriptedCompleter::new(|| Err(Error::LLMError("rate limited".into())));
    let engine = engine_for(HouseholdRecords {
        vendors: vec![vendor("v1", "ABC Plumbing", "Plumber", Some("555-1212"))],
        ..Default::default()
    })
    .with_answer_engine(AnswerEngine::with_completer(completer.clone()).with_bounds(200, 0.0));

    let result = engine
        .ask_at(HOUSEHOLD, "who is our plumber?", now())
        .await
        .unwrap();

    assert_eq!(result.answer, "ABC Plumbing (Plumber) phone: 555-1212");
    assert_eq!(completer.calls(), 1);
}

#[tokio::test]
async fn test_blank_model_answer_falls_back() {
    let completer = ScriptedCompleter::new(|| Ok("   ".into()));
    let engine = engine_for(HouseholdRecords::default()).with_completer(completer);

    let result = engine
        .ask_at(HOUSEHOLD, "tell me about the garden", now())
        .await
        .unwrap();
    assert_eq!(result.answer, NOTHING_FOUND);
}

#[tokio::test]
async fn test_sqlite_store_feeds_engine() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("homegraph.db")).await.unwrap();
    let store = SqliteRecordStore::from_database(&db);

    let mut records = plumbing_household();
    records.spending.push(spend("old", "Ancient repair", 900.0, "ABC Plumbing", "2025-01-01"));
    let summary = store.import(HOUSEHOLD, &records).await.unwrap();
    assert_eq!(summary.total(), 5);

    let engine = HouseholdEngine::new(Arc::new(store));
    let result = engine
        .ask_at(HOUSEHOLD, "anything new?", now())
        .await
        .unwrap();

    // The old expense falls outside the recency window
    assert_eq!(
        result.connections,
        vec!["You've spent $600 with ABC Plumbing in the last 6 months".to_string()]
    );
    assert!(result.graph_summary.contains("3 spending items"));

    db.close().await;
}

#[tokio::test]
async fn test_unknown_household_is_empty() {
    let engine = engine_for(full_household());
    let graph = engine.build_graph_at("someone-else", now()).await.unwrap();
    assert!(graph.is_empty());
}
