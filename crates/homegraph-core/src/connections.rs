//! Proactive observations mined from graph edges

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::{format_short, parse_date};
use crate::graph::{GraphNode, HouseholdGraph, NodeKey, Relation};
use crate::records::model::format_cents;

/// Vendor spend above this many cents is worth mentioning
pub const SPEND_THRESHOLD_CENTS: i64 = 50_000;

/// Personal dates at most this many days out are mentioned
pub const UPCOMING_DAYS: i64 = 30;

/// Vendors with at least this many tasks or visits are mentioned
pub const ENGAGEMENT_THRESHOLD: usize = 5;

/// Run all three passes: spend, upcoming dates, engagement
pub fn mine_connections(graph: &HouseholdGraph, today: NaiveDate) -> Vec<String> {
    let index = graph.index();
    let mut insights = vendor_spend(graph, &index);
    insights.extend(upcoming_dates(graph, &index, today));
    insights.extend(vendor_engagement(graph, &index));
    insights
}

fn label_of<'g>(index: &HashMap<&NodeKey, &'g GraphNode>, key: &NodeKey) -> Option<&'g str> {
    index.get(key).map(|node| node.label.as_str())
}

/// Keys in first-appearance order with a running value each
struct Tally<'g, V> {
    order: Vec<&'g NodeKey>,
    values: HashMap<&'g NodeKey, V>,
}

impl<'g, V: Default> Tally<'g, V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            values: HashMap::new(),
        }
    }

    fn entry(&mut self, key: &'g NodeKey) -> &mut V {
        if !self.values.contains_key(key) {
            self.order.push(key);
        }
        self.values.entry(key).or_default()
    }

    fn into_ordered(mut self) -> Vec<(&'g NodeKey, V)> {
        self.order
            .iter()
            .filter_map(|key| self.values.remove(key).map(|value| (*key, value)))
            .collect()
    }
}

fn vendor_spend(graph: &HouseholdGraph, index: &HashMap<&NodeKey, &GraphNode>) -> Vec<String> {
    let mut totals: Tally<'_, i64> = Tally::new();
    for edge in graph.edges.iter().filter(|e| e.relation == Relation::PaidTo) {
        let cents = edge.amount().map(|amount| (amount * 100.0).round() as i64).unwrap_or(0);
        *totals.entry(&edge.to) += cents;
    }

    totals
        .into_ordered()
        .into_iter()
        .filter(|(_, cents)| *cents > SPEND_THRESHOLD_CENTS)
        .filter_map(|(vendor, cents)| {
            let name = label_of(index, vendor)?;
            Some(format!(
                "You've spent {} with {} in the last 6 months",
                format_cents(cents),
                name
            ))
        })
        .collect()
}

fn upcoming_dates(
    graph: &HouseholdGraph,
    index: &HashMap<&NodeKey, &GraphNode>,
    today: NaiveDate,
) -> Vec<String> {
    graph
        .edges
        .iter()
        .filter(|e| e.relation == Relation::BelongsTo)
        .filter_map(|edge| {
            let date_node = index.get(&edge.from)?;
            let person = label_of(index, &edge.to)?;
            let when = parse_date(date_node.attr_str("date")?)?;
            let days = (when - today).num_days();
            if days <= 0 || days > UPCOMING_DAYS {
                return None;
            }
            Some(format!(
                "{}'s {} is in {} days ({})",
                person,
                date_node.label,
                days,
                format_short(when)
            ))
        })
        .collect()
}

fn vendor_engagement(
    graph: &HouseholdGraph,
    index: &HashMap<&NodeKey, &GraphNode>,
) -> Vec<String> {
    let mut counts: Tally<'_, usize> = Tally::new();
    for edge in &graph.edges {
        match edge.relation {
            Relation::InvolvesVendor => *counts.entry(&edge.to) += 1,
            Relation::PerformedService => *counts.entry(&edge.from) += 1,
            _ => {}
        }
    }

    counts
        .into_ordered()
        .into_iter()
        .filter(|(_, count)| *count >= ENGAGEMENT_THRESHOLD)
        .filter_map(|(vendor, count)| {
            let name = label_of(index, vendor)?;
            Some(format!(
                "{} has been involved in {} tasks/visits recently",
                name, count
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::records::{HouseholdRecords, ImportantDate, Person, SpendingItem, Task, Vendor};
    use chrono::{DateTime, Utc};

    fn ts() -> DateTime<Utc> {
        "2026-05-01T00:00:00Z".parse().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn vendor(id: &str, name: &str, category: Option<&str>) -> Vendor {
        Vendor {
            id: id.into(),
            name: name.into(),
            category: category.map(Into::into),
            phone: None,
            email: None,
            rating: None,
            notes: None,
            created_at: ts(),
        }
    }

    fn spend(id: &str, vendor: &str, amount: f64) -> SpendingItem {
        SpendingItem {
            id: id.into(),
            description: None,
            amount,
            vendor: Some(vendor.into()),
            category: None,
            date: None,
            task_id: None,
            created_at: ts(),
        }
    }

    fn anniversary(date: &str) -> HouseholdRecords {
        HouseholdRecords {
            people: vec![Person {
                id: "p1".into(),
                name: "Jane".into(),
                role: None,
                email: None,
                phone: None,
                birthday: None,
                allergies: vec![],
                dietary_restrictions: vec![],
                notes: None,
                created_at: ts(),
            }],
            dates: vec![ImportantDate {
                id: "d1".into(),
                title: "Anniversary".into(),
                date: Some(date.into()),
                person_id: Some("p1".into()),
                category: None,
                notes: None,
                created_at: ts(),
            }],
            ..Default::default()
        }
    }

    fn mine(records: &HouseholdRecords) -> Vec<String> {
        mine_connections(&GraphBuilder::new().build(records), today())
    }

    #[test]
    fn test_vendor_spend_scenario() {
        let records = HouseholdRecords {
            vendors: vec![vendor("v1", "ABC Plumbing", None)],
            spending: vec![
                spend("s1", "ABC Plumbing", 200.0),
                spend("s2", "ABC Plumbing", 200.0),
                spend("s3", "abc plumbing", 200.0),
            ],
            ..Default::default()
        };
        assert_eq!(
            mine(&records),
            vec!["You've spent $600 with ABC Plumbing in the last 6 months"]
        );
    }

    #[test]
    fn test_vendor_spend_boundary() {
        let exact = HouseholdRecords {
            vendors: vec![vendor("v1", "ABC Plumbing", None)],
            spending: vec![spend("s1", "ABC Plumbing", 300.0), spend("s2", "ABC Plumbing", 200.0)],
            ..Default::default()
        };
        assert!(mine(&exact).is_empty());

        let over = HouseholdRecords {
            spending: vec![spend("s1", "ABC Plumbing", 300.0), spend("s2", "ABC Plumbing", 200.01)],
            ..exact
        };
        assert_eq!(
            mine(&over),
            vec!["You've spent $500.01 with ABC Plumbing in the last 6 months"]
        );
    }

    #[test]
    fn test_upcoming_date_scenario() {
        let insights = mine(&anniversary("2026-10-26"));
        assert_eq!(insights, vec!["Jane's Anniversary is in 10 days (Oct 26)"]);
    }

    #[test]
    fn test_upcoming_date_window() {
        assert!(mine(&anniversary("2026-10-16")).is_empty());
        assert!(mine(&anniversary("2026-10-01")).is_empty());
        assert!(mine(&anniversary("2026-11-16")).is_empty());
        assert_eq!(mine(&anniversary("2026-11-15")).len(), 1);
        assert!(mine(&anniversary("someday")).is_empty());
    }

    #[test]
    fn test_vendor_engagement() {
        let task = |id: &str| Task {
            id: id.into(),
            title: format!("Call Sparkle about room {id}"),
            description: None,
            category: None,
            status: None,
            priority: None,
            due_at: None,
            scheduled_at: None,
            completed_at: None,
            created_at: ts(),
        };
        let mut records = HouseholdRecords {
            vendors: vec![vendor("v1", "Sparkle", Some("Cleaning"))],
            tasks: (1..=4).map(|i| task(&i.to_string())).collect(),
            ..Default::default()
        };
        assert!(mine(&records).is_empty());

        records.tasks.push(task("5"));
        assert_eq!(
            mine(&records),
            vec!["Sparkle has been involved in 5 tasks/visits recently"]
        );
    }

    #[test]
    fn test_passes_concatenate_in_order() {
        let mut records = anniversary("2026-10-26");
        records.vendors.push(vendor("v1", "ABC Plumbing", None));
        records.spending.push(spend("s1", "ABC Plumbing", 900.0));

        let insights = mine(&records);
        assert_eq!(insights.len(), 2);
        assert!(insights[0].starts_with("You've spent $900"));
        assert!(insights[1].starts_with("Jane's Anniversary"));
    }
}
