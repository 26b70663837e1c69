//! Graph edges

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::NodeKey;

/// Kinds of relationship the builder infers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Important date belongs to a person
    BelongsTo,
    /// Spending item paid to a vendor
    PaidTo,
    /// Spending item recorded against a task
    ExpenseFor,
    /// Event held at a location
    AtLocation,
    /// Vendor performed a service visit
    PerformedService,
    /// Task involves a vendor
    InvolvesVendor,
    /// Preference mentions a vendor
    ReferencesVendor,
}

impl Relation {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::PaidTo => "paid_to",
            Self::ExpenseFor => "expense_for",
            Self::AtLocation => "at_location",
            Self::PerformedService => "performed_service",
            Self::InvolvesVendor => "involves_vendor",
            Self::ReferencesVendor => "references_vendor",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl GraphEdge {
    pub fn new(from: NodeKey, to: NodeKey, relation: Relation) -> Self {
        Self {
            from,
            to,
            relation,
            weight: None,
            metadata: None,
        }
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight.clamp(0.0, 1.0));
        self
    }

    /// Attach one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Amount carried by a `paid_to` edge
    pub fn amount(&self) -> Option<f64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("amount"))
            .and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordKind;

    #[test]
    fn test_edge_metadata() {
        let edge = GraphEdge::new(
            NodeKey::new(RecordKind::Spending, "s1"),
            NodeKey::new(RecordKind::Vendor, "v1"),
            Relation::PaidTo,
        )
        .with_metadata("amount", 200.0);

        assert_eq!(edge.amount(), Some(200.0));
        assert_eq!(edge.weight, None);
    }

    #[test]
    fn test_edge_serialization() {
        let edge = GraphEdge::new(
            NodeKey::new(RecordKind::Date, "d1"),
            NodeKey::new(RecordKind::Person, "p1"),
            Relation::BelongsTo,
        )
        .with_weight(1.5);

        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["from"], "date:d1");
        assert_eq!(json["relation"], "belongs_to");
        assert_eq!(json["weight"], 1.0);
        assert!(json.get("metadata").is_none());
    }
}
