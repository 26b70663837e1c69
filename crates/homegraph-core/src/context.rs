//! Renders a household graph as a bounded text block
//!
//! The output is what the language model sees, so it is deterministic and
//! capped: 50 nodes per section and 80 relationships.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::graph::{GraphEdge, GraphNode, HouseholdGraph, NodeKey, NodeType};

/// Nodes rendered per section
pub const MAX_NODES_PER_SECTION: usize = 50;

/// Relationships rendered
pub const MAX_EDGES: usize = 80;

/// Attributes that identify rather than describe
const HIDDEN_ATTRIBUTES: [&str; 2] = ["id", "household_id"];

/// Serialize the graph into sectioned text
pub fn serialize_graph(graph: &HouseholdGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Household summary: {}", graph.summary);

    for node_type in NodeType::all() {
        let mut section = graph.nodes_of(*node_type).take(MAX_NODES_PER_SECTION).peekable();
        if section.peek().is_none() {
            continue;
        }

        let _ = writeln!(out, "\n## {}", node_type.heading());
        for node in section {
            let _ = writeln!(out, "- {}", render_node(node));
        }
    }

    if !graph.edges.is_empty() {
        let labels: HashMap<&NodeKey, &str> = graph
            .nodes
            .iter()
            .map(|node| (&node.id, node.label.as_str()))
            .collect();

        let _ = writeln!(out, "\n## Relationships");
        for edge in graph.edges.iter().take(MAX_EDGES) {
            let _ = writeln!(out, "- {}", render_edge(edge, &labels));
        }
    }

    out
}

/// `label (key=value, ...)`, or just the label when nothing is left
pub fn render_node(node: &GraphNode) -> String {
    let details = render_pairs(&node.attributes, &HIDDEN_ATTRIBUTES);
    if details.is_empty() {
        node.label.clone()
    } else {
        format!("{} ({})", node.label, details)
    }
}

fn render_edge(edge: &GraphEdge, labels: &HashMap<&NodeKey, &str>) -> String {
    let from = labels.get(&edge.from).copied().unwrap_or("?");
    let to = labels.get(&edge.to).copied().unwrap_or("?");
    let mut line = format!("{} → [{}] → {}", from, edge.relation, to);

    if let Some(metadata) = &edge.metadata {
        let details = render_pairs(metadata, &[]);
        if !details.is_empty() {
            let _ = write!(line, " ({})", details);
        }
    }
    line
}

fn render_pairs(map: &Map<String, Value>, hidden: &[&str]) -> String {
    map.iter()
        .filter(|(key, _)| !hidden.contains(&key.as_str()))
        .filter_map(|(key, value)| render_value(value).map(|v| format!("{}={}", key, v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one attribute value; `None` for null, blank strings and empty arrays
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(map) => {
            let inner = render_pairs(map, &[]);
            if inner.is_empty() { None } else { Some(inner) }
        }
        other => Some(other.to_string()),
    }
}
