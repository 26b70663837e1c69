//! A point-in-time household graph and its summary

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::edge::GraphEdge;
use super::node::{GraphNode, NodeKey, NodeType};

/// Node and edge tallies behind the summary string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub people: usize,
    pub vendors: usize,
    pub tasks: usize,
    pub preferences: usize,
    pub events: usize,
    pub spending: usize,
    pub locations: usize,
    pub dates: usize,
    pub relationships: usize,
}

impl GraphSummary {
    /// Count nodes by type and edges
    pub fn tally(nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
        let mut summary = Self {
            relationships: edges.len(),
            ..Self::default()
        };
        for node in nodes {
            let slot = match node.node_type {
                NodeType::Person => &mut summary.people,
                NodeType::Vendor => &mut summary.vendors,
                NodeType::Task => &mut summary.tasks,
                NodeType::Preference => &mut summary.preferences,
                NodeType::Event => &mut summary.events,
                NodeType::Spending => &mut summary.spending,
                NodeType::Location => &mut summary.locations,
                NodeType::Date => &mut summary.dates,
            };
            *slot += 1;
        }
        summary
    }

    pub fn node_count(&self) -> usize {
        self.people
            + self.vendors
            + self.tasks
            + self.preferences
            + self.events
            + self.spending
            + self.locations
            + self.dates
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} people, {} vendors, {} tasks, {} preferences, {} events, {} spending items, {} locations, {} important dates, {} relationships",
            self.people,
            self.vendors,
            self.tasks,
            self.preferences,
            self.events,
            self.spending,
            self.locations,
            self.dates,
            self.relationships
        )
    }
}

/// Nodes, edges and a one-line summary for a single household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub summary: String,
}

impl HouseholdGraph {
    /// Assemble a graph, computing its summary
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let summary = GraphSummary::tally(&nodes, &edges).to_string();
        Self {
            nodes,
            edges,
            summary,
        }
    }

    /// Recount the graph
    pub fn tally(&self) -> GraphSummary {
        GraphSummary::tally(&self.nodes, &self.edges)
    }

    /// Node lookup by key
    pub fn index(&self) -> HashMap<&NodeKey, &GraphNode> {
        self.nodes.iter().map(|node| (&node.id, node)).collect()
    }

    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == key)
    }

    pub fn nodes_of(&self, node_type: NodeType) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |node| node.node_type == node_type)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;
    use crate::records::RecordKind;
    use serde_json::Map;

    fn node(kind: RecordKind, id: &str) -> GraphNode {
        GraphNode {
            id: NodeKey::new(kind, id),
            node_type: kind.node_type(),
            label: id.to_string(),
            attributes: Map::new(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let graph = HouseholdGraph::new(vec![], vec![]);
        assert_eq!(
            graph.summary,
            "0 people, 0 vendors, 0 tasks, 0 preferences, 0 events, 0 spending items, 0 locations, 0 important dates, 0 relationships"
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_summary_merges_shared_types() {
        let nodes = vec![
            node(RecordKind::Preference, "1"),
            node(RecordKind::LearnedPreference, "1"),
            node(RecordKind::Event, "e"),
            node(RecordKind::Visit, "v"),
            node(RecordKind::Date, "d"),
        ];
        let edges = vec![GraphEdge::new(
            NodeKey::new(RecordKind::Date, "d"),
            NodeKey::new(RecordKind::Event, "e"),
            Relation::BelongsTo,
        )];
        let graph = HouseholdGraph::new(nodes, edges);
        let tally = graph.tally();

        assert_eq!(tally.preferences, 2);
        assert_eq!(tally.events, 2);
        assert_eq!(tally.dates, 1);
        assert_eq!(tally.relationships, 1);
        assert_eq!(tally.node_count(), graph.nodes.len());
        assert!(graph.summary.starts_with("0 people, 0 vendors, 0 tasks, 2 preferences, 2 events"));
    }

    #[test]
    fn test_lookup() {
        let graph = HouseholdGraph::new(vec![node(RecordKind::Vendor, "v1")], vec![]);
        let key = NodeKey::new(RecordKind::Vendor, "v1");
        assert_eq!(graph.node(&key).map(|n| n.label.as_str()), Some("v1"));
        assert!(graph.index().contains_key(&key));
        assert_eq!(graph.nodes_of(NodeType::Vendor).count(), 1);
        assert_eq!(graph.nodes_of(NodeType::Person).count(), 0);
    }
}
