//! Turns loaded records into a household graph

use std::collections::HashSet;

use tracing::{debug, warn};

use super::edge::GraphEdge;
use super::household::HouseholdGraph;
use super::node::{GraphNode, NodeKey};
use super::rules::{EdgeRule, default_rules};
use crate::records::{HouseholdRecord, HouseholdRecords};

/// Builds graphs with a fixed list of edge rules
pub struct GraphBuilder {
    rules: Vec<Box<dyn EdgeRule>>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Builder with the built-in rules
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Builder with a custom rule list
    pub fn with_rules(rules: Vec<Box<dyn EdgeRule>>) -> Self {
        Self { rules }
    }

    /// Append a rule
    pub fn add_rule(mut self, rule: Box<dyn EdgeRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Build a graph snapshot
    ///
    /// Node order follows the record lists: people, vendors, tasks, stated
    /// then learned preferences, events then visits, spending, locations,
    /// dates. Edges follow rule order.
    pub fn build(&self, records: &HouseholdRecords) -> HouseholdGraph {
        let mut nodes = Vec::with_capacity(records.total());
        push_nodes(&mut nodes, &records.people);
        push_nodes(&mut nodes, &records.vendors);
        push_nodes(&mut nodes, &records.tasks);
        push_nodes(&mut nodes, &records.preferences);
        push_nodes(&mut nodes, &records.learned_preferences);
        push_nodes(&mut nodes, &records.events);
        push_nodes(&mut nodes, &records.visits);
        push_nodes(&mut nodes, &records.spending);
        push_nodes(&mut nodes, &records.locations);
        push_nodes(&mut nodes, &records.dates);

        let known: HashSet<&NodeKey> = nodes.iter().map(|node| &node.id).collect();
        let mut edges: Vec<GraphEdge> = Vec::new();

        for rule in &self.rules {
            let proposed = rule.infer(records);
            let before = edges.len();
            for edge in proposed {
                if known.contains(&edge.from) && known.contains(&edge.to) {
                    edges.push(edge);
                } else {
                    warn!(
                        rule = rule.name(),
                        from = %edge.from,
                        to = %edge.to,
                        "Dropping edge with an endpoint outside the graph"
                    );
                }
            }
            debug!(rule = rule.name(), edges = edges.len() - before, "Applied edge rule");
        }

        HouseholdGraph::new(nodes, edges)
    }
}

fn push_nodes<T: HouseholdRecord>(nodes: &mut Vec<GraphNode>, records: &[T]) {
    nodes.extend(records.iter().map(GraphNode::from_record));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, Relation};
    use crate::records::{RecordKind, Vendor};

    struct PhantomRule;

    impl EdgeRule for PhantomRule {
        fn name(&self) -> &'static str {
            "phantom"
        }

        fn relation(&self) -> Relation {
            Relation::InvolvesVendor
        }

        fn infer(&self, records: &HouseholdRecords) -> Vec<GraphEdge> {
            records
                .vendors
                .iter()
                .map(|vendor| {
                    GraphEdge::new(
                        NodeKey::new(RecordKind::Task, "missing"),
                        NodeKey::of(vendor),
                        self.relation(),
                    )
                })
                .collect()
        }
    }

    fn records() -> HouseholdRecords {
        HouseholdRecords {
            vendors: vec![Vendor {
                id: "v1".into(),
                name: "ABC Plumbing".into(),
                category: Some("Plumber".into()),
                phone: None,
                email: None,
                rating: None,
                notes: None,
                created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_builder_has_seven_rules() {
        assert_eq!(GraphBuilder::new().rule_names().len(), 7);
    }

    #[test]
    fn test_empty_records_build_empty_graph() {
        let graph = GraphBuilder::new().build(&HouseholdRecords::default());
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.summary.ends_with("0 relationships"));
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let builder = GraphBuilder::with_rules(vec![]).add_rule(Box::new(PhantomRule));
        let graph = builder.build(&records());

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].node_type, NodeType::Vendor);
        assert!(graph.edges.is_empty());
    }
}
