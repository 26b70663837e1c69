//! Rule-based answers built only from the relevant nodes
//!
//! Used when no model is configured or the model call fails. Every branch
//! produces some text; nothing here can fail.

use chrono::{DateTime, Utc};

use crate::dates::{format_long, parse_datetime};
use crate::graph::{GraphNode, NodeType};
use crate::records::model::format_cents;

/// Answer when nothing relevant was found for a general question
pub const NOTHING_FOUND: &str = "I couldn't find anything in your household records related to that question. Try asking about people, vendors, tasks, spending, events, or preferences.";

const MAX_CONTACTS: usize = 5;
const MAX_SCHEDULE_ITEMS: usize = 7;
const MAX_GENERAL_ITEMS: usize = 5;

/// What a question is after, decided from cue words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// "when ... last/recent"
    Temporal,
    /// "how much", "spend", "cost"
    Monetary,
    /// "who", "contact", "vendor"
    Identity,
    /// "allerg", "diet", "food"
    Dietary,
    /// "upcoming", "next", "schedule", "calendar"
    Scheduling,
    General,
}

impl Intent {
    /// Classify a question; earlier cues win
    pub fn detect(question: &str) -> Self {
        let q = question.to_lowercase();

        if q.contains("when") && has_any(&q, &["last", "recent"]) {
            Self::Temporal
        } else if has_any(&q, &["how much", "spend", "cost"]) {
            Self::Monetary
        } else if has_any(&q, &["who", "contact", "vendor"]) {
            Self::Identity
        } else if has_any(&q, &["allerg", "diet", "food"]) {
            Self::Dietary
        } else if has_any(&q, &["upcoming", "next", "schedule", "calendar"]) {
            Self::Scheduling
        } else {
            Self::General
        }
    }
}

fn has_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

/// Answer a question from its relevant nodes without a model
pub fn fallback_answer(question: &str, relevant: &[&GraphNode]) -> String {
    match Intent::detect(question) {
        Intent::Temporal => temporal(relevant),
        Intent::Monetary => monetary(relevant),
        Intent::Identity => identity(relevant),
        Intent::Dietary => dietary(relevant),
        Intent::Scheduling => scheduling(relevant),
        Intent::General => general(relevant),
    }
}

/// Fields that date a node; the first one that parses wins
const DATE_FIELDS: [&str; 5] = ["scheduled_at", "completed_at", "created_at", "start_at", "date"];

fn node_date(node: &GraphNode) -> Option<DateTime<Utc>> {
    DATE_FIELDS
        .iter()
        .find_map(|field| node.attr_str(field).and_then(parse_datetime))
}

fn temporal(relevant: &[&GraphNode]) -> String {
    let candidates: Vec<&GraphNode> = relevant
        .iter()
        .copied()
        .filter(|n| matches!(n.node_type, NodeType::Task | NodeType::Event | NodeType::Spending))
        .collect();

    let mut latest: Option<(&GraphNode, DateTime<Utc>)> = None;
    for (node, ts) in candidates.iter().filter_map(|n| node_date(n).map(|ts| (*n, ts))) {
        if latest.is_none_or(|(_, best)| ts > best) {
            latest = Some((node, ts));
        }
    }

    match latest {
        Some((node, ts)) => format!(
            "The most recent was {} on {}. I found {} related {}.",
            node.label,
            format_long(ts),
            candidates.len(),
            plural(candidates.len(), "record", "records")
        ),
        None => "I couldn't find any dated records related to that question.".to_string(),
    }
}

fn monetary(relevant: &[&GraphNode]) -> String {
    let spending: Vec<&GraphNode> = relevant
        .iter()
        .copied()
        .filter(|n| n.node_type == NodeType::Spending)
        .collect();

    if spending.is_empty() {
        return "I couldn't find any spending records related to that question.".to_string();
    }

    let total: i64 = spending
        .iter()
        .filter_map(|n| n.attr_f64("amount"))
        .map(|amount| (amount * 100.0).round() as i64)
        .sum();

    let mut most_recent = spending[0];
    let mut most_recent_at = spend_date(most_recent);
    for &node in &spending[1..] {
        let at = spend_date(node);
        if at > most_recent_at {
            most_recent = node;
            most_recent_at = at;
        }
    }

    format!(
        "You've spent {} across {} matching {}. The most recent was {}.",
        format_cents(total),
        spending.len(),
        plural(spending.len(), "expense", "expenses"),
        most_recent.label
    )
}

fn spend_date(node: &GraphNode) -> Option<DateTime<Utc>> {
    node.attr_str("date")
        .and_then(parse_datetime)
        .or_else(|| node.attr_str("created_at").and_then(parse_datetime))
}

fn identity(relevant: &[&GraphNode]) -> String {
    let lines: Vec<String> = relevant
        .iter()
        .filter(|n| matches!(n.node_type, NodeType::Person | NodeType::Vendor))
        .take(MAX_CONTACTS)
        .map(|n| contact_line(n))
        .collect();

    if lines.is_empty() {
        return "I couldn't find any people or vendors related to that question.".to_string();
    }
    lines.join("\n")
}

fn contact_line(node: &GraphNode) -> String {
    let mut line = node.label.clone();
    if let Some(role) = node.attr_str("role") {
        line.push_str(&format!(" ({})", role));
    }
    if let Some(category) = node.attr_str("category") {
        line.push_str(&format!(" ({})", category));
    }
    if let Some(phone) = node.attr_str("phone") {
        line.push_str(&format!(" phone: {}", phone));
    }
    if let Some(email) = node.attr_str("email") {
        line.push_str(&format!(" email: {}", email));
    }
    line
}

fn dietary(relevant: &[&GraphNode]) -> String {
    let mut lines = Vec::new();

    for node in relevant.iter().filter(|n| n.node_type == NodeType::Person) {
        let allergies = node.attr_list("allergies");
        let restrictions = node.attr_list("dietary_restrictions");
        let mut parts = Vec::new();
        if !allergies.is_empty() {
            parts.push(format!("allergies: {}", allergies.join(", ")));
        }
        if !restrictions.is_empty() {
            parts.push(format!("dietary restrictions: {}", restrictions.join(", ")));
        }
        if !parts.is_empty() {
            lines.push(format!("{}: {}", node.label, parts.join("; ")));
        }
    }

    for node in relevant.iter().filter(|n| n.node_type == NodeType::Preference) {
        let key = node.attr_str("key").unwrap_or_default();
        let value = node.attr_str("value").unwrap_or_default();
        let mut line = format!("{} = {}", key, value);
        if node.attr_bool("is_no_go") {
            line.push_str(" (NO-GO)");
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return "I couldn't find any allergy or dietary information related to that question."
            .to_string();
    }
    lines.join("\n")
}

fn scheduling(relevant: &[&GraphNode]) -> String {
    // The cap covers events and dates; due tasks are always appended
    let calendar = relevant
        .iter()
        .copied()
        .filter_map(|n| match n.node_type {
            NodeType::Event => Some((n, n.attr_str("start_at").or_else(|| n.attr_str("date")))),
            NodeType::Date => Some((n, n.attr_str("date"))),
            _ => None,
        })
        .take(MAX_SCHEDULE_ITEMS);
    let due_tasks = relevant
        .iter()
        .copied()
        .filter(|n| n.node_type == NodeType::Task)
        .filter_map(|n| n.attr_str("due_at").map(|due| (n, Some(due))));

    let lines: Vec<String> = calendar
        .chain(due_tasks)
        .map(|(n, when)| match when.and_then(parse_datetime).map(format_long) {
            Some(date) => format!("{} ({})", n.label, date),
            None => n.label.clone(),
        })
        .collect();

    if lines.is_empty() {
        return "I couldn't find any upcoming events or dates related to that question."
            .to_string();
    }
    lines.join("\n")
}

fn general(relevant: &[&GraphNode]) -> String {
    if relevant.is_empty() {
        return NOTHING_FOUND.to_string();
    }

    let lines: Vec<String> = relevant
        .iter()
        .take(MAX_GENERAL_ITEMS)
        .map(|n| format!("{} ({})", n.label, n.node_type))
        .collect();
    format!("Here's what I found:\n{}", lines.join("\n"))
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
