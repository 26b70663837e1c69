//! Edge inference rules
//!
//! Each rule looks at the loaded records and proposes edges of one relation.
//! Correlation is plain case-insensitive string containment; it will miss
//! and mis-join now and then, and that is accepted.

use super::edge::{GraphEdge, Relation};
use super::node::NodeKey;
use crate::records::{HouseholdRecord, HouseholdRecords, Vendor};

/// A strategy that infers one kind of edge from household records
pub trait EdgeRule: Send + Sync {
    /// Short identifier for logging
    fn name(&self) -> &'static str;

    /// Relation this rule emits
    fn relation(&self) -> Relation;

    /// Propose edges; must be deterministic for a given input
    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge>;
}

/// The seven built-in rules
pub fn default_rules() -> Vec<Box<dyn EdgeRule>> {
    vec![
        Box::new(DateBelongsToPerson),
        Box::new(SpendingPaidToVendor),
        Box::new(SpendingExpenseForTask),
        Box::new(EventAtLocation),
        Box::new(CleaningVendorPerformedService),
        Box::new(TaskInvolvesVendor),
        Box::new(PreferenceReferencesVendor),
    ]
}

/// Lower-cased, trimmed text; `None` when blank
fn folded(text: Option<&str>) -> Option<String> {
    text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty())
}

fn contains_either_way(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// `date -belongs_to-> person` for dates carrying a loaded person id
pub struct DateBelongsToPerson;

impl EdgeRule for DateBelongsToPerson {
    fn name(&self) -> &'static str {
        "date_belongs_to_person"
    }

    fn relation(&self) -> Relation {
        Relation::BelongsTo
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        records
            .dates
            .iter()
            .filter_map(|date| {
                let person_id = date.person_id.as_deref()?;
                let person = records.people.iter().find(|p| p.id == person_id)?;
                Some(GraphEdge::new(
                    NodeKey::of(date),
                    NodeKey::of(person),
                    self.relation(),
                ))
            })
            .collect()
    }
}

/// `spending -paid_to-> vendor` when the vendor text equals a vendor name
pub struct SpendingPaidToVendor;

impl EdgeRule for SpendingPaidToVendor {
    fn name(&self) -> &'static str {
        "spending_paid_to_vendor"
    }

    fn relation(&self) -> Relation {
        Relation::PaidTo
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        records
            .spending
            .iter()
            .filter_map(|item| {
                let wanted = folded(item.vendor.as_deref())?;
                let vendor = records
                    .vendors
                    .iter()
                    .find(|v| folded(Some(v.name.as_str())).as_ref() == Some(&wanted))?;
                Some(
                    GraphEdge::new(NodeKey::of(item), NodeKey::of(vendor), self.relation())
                        .with_metadata("amount", item.amount),
                )
            })
            .collect()
    }
}

/// `spending -expense_for-> task` for spending that names a loaded task
pub struct SpendingExpenseForTask;

impl EdgeRule for SpendingExpenseForTask {
    fn name(&self) -> &'static str {
        "spending_expense_for_task"
    }

    fn relation(&self) -> Relation {
        Relation::ExpenseFor
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        records
            .spending
            .iter()
            .filter_map(|item| {
                let task_id = item.task_id.as_deref()?;
                let task = records.tasks.iter().find(|t| t.id == task_id)?;
                Some(GraphEdge::new(
                    NodeKey::of(item),
                    NodeKey::of(task),
                    self.relation(),
                ))
            })
            .collect()
    }
}

/// `event -at_location-> location` by name equality or address containment
pub struct EventAtLocation;

impl EdgeRule for EventAtLocation {
    fn name(&self) -> &'static str {
        "event_at_location"
    }

    fn relation(&self) -> Relation {
        Relation::AtLocation
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        records
            .events
            .iter()
            .filter_map(|event| {
                let place = folded(event.location.as_deref())?;
                let location = records.locations.iter().find(|loc| {
                    folded(Some(loc.name.as_str())).as_deref() == Some(place.as_str())
                        || folded(loc.address.as_deref())
                            .is_some_and(|address| place.contains(&address))
                })?;
                Some(GraphEdge::new(
                    NodeKey::of(event),
                    NodeKey::of(location),
                    self.relation(),
                ))
            })
            .collect()
    }
}

/// `vendor -performed_service-> visit` from the first cleaning vendor to
/// every visit
pub struct CleaningVendorPerformedService;

impl CleaningVendorPerformedService {
    fn cleaner(vendors: &[Vendor]) -> Option<&Vendor> {
        vendors.iter().find(|v| {
            folded(v.category.as_deref()).is_some_and(|category| category.contains("clean"))
        })
    }
}

impl EdgeRule for CleaningVendorPerformedService {
    fn name(&self) -> &'static str {
        "cleaning_vendor_performed_service"
    }

    fn relation(&self) -> Relation {
        Relation::PerformedService
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        let Some(cleaner) = Self::cleaner(&records.vendors) else {
            return Vec::new();
        };
        records
            .visits
            .iter()
            .map(|visit| GraphEdge::new(NodeKey::of(cleaner), NodeKey::of(visit), self.relation()))
            .collect()
    }
}

/// `task -involves_vendor-> vendor` by title mention or category overlap
pub struct TaskInvolvesVendor;

impl EdgeRule for TaskInvolvesVendor {
    fn name(&self) -> &'static str {
        "task_involves_vendor"
    }

    fn relation(&self) -> Relation {
        Relation::InvolvesVendor
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        let mut edges = Vec::new();
        for task in &records.tasks {
            let title = folded(Some(task.title.as_str()));
            let task_category = folded(task.category.as_deref());

            for vendor in &records.vendors {
                let named = match (&title, folded(Some(vendor.name.as_str()))) {
                    (Some(title), Some(name)) => title.contains(&name),
                    _ => false,
                };
                let same_trade = match (&task_category, folded(vendor.category.as_deref())) {
                    (Some(task_cat), Some(vendor_cat)) => contains_either_way(task_cat, &vendor_cat),
                    _ => false,
                };
                if named || same_trade {
                    edges.push(GraphEdge::new(
                        NodeKey::of(task),
                        NodeKey::of(vendor),
                        self.relation(),
                    ));
                }
            }
        }
        edges
    }
}

/// `preference -references_vendor-> vendor` when value and vendor name
/// contain one another; covers stated and learned preferences
pub struct PreferenceReferencesVendor;

impl PreferenceReferencesVendor {
    fn link<T: HouseholdRecord>(
        &self,
        preference: &T,
        value: &str,
        vendors: &[Vendor],
        edges: &mut Vec<GraphEdge>,
    ) {
        let Some(value) = folded(Some(value)) else {
            return;
        };
        for vendor in vendors {
            let mentioned = folded(Some(vendor.name.as_str()))
                .is_some_and(|name| contains_either_way(&value, &name));
            if mentioned {
                edges.push(GraphEdge::new(
                    NodeKey::of(preference),
                    NodeKey::of(vendor),
                    self.relation(),
                ));
            }
        }
    }
}

impl EdgeRule for PreferenceReferencesVendor {
    fn name(&self) -> &'static str {
        "preference_references_vendor"
    }

    fn relation(&self) -> Relation {
        Relation::ReferencesVendor
    }

    fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
        let mut edges = Vec::new();
        for preference in &records.preferences {
            self.link(preference, &preference.value, &records.vendors, &mut edges);
        }
        for learned in &records.learned_preferences {
            self.link(learned, &learned.value, &records.vendors, &mut edges);
        }
        edges
    }
}
