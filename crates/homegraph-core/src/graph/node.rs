//! Graph nodes
//!
//! A node is one household record viewed through the graph: a composite key,
//! a coarse type, a display label and the record's own fields as attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::records::{HouseholdRecord, RecordKind};

/// Coarse node category shared by one or more record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Person,
    Vendor,
    Task,
    Preference,
    Event,
    Spending,
    Location,
    Date,
}

impl NodeType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Vendor => "vendor",
            Self::Task => "task",
            Self::Preference => "preference",
            Self::Event => "event",
            Self::Spending => "spending",
            Self::Location => "location",
            Self::Date => "date",
        }
    }

    /// Section heading used when rendering context
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Person => "People",
            Self::Vendor => "Vendors & Service Providers",
            Self::Task => "Tasks",
            Self::Preference => "Preferences",
            Self::Event => "Events & Calendar",
            Self::Spending => "Spending",
            Self::Location => "Locations",
            Self::Date => "Important Dates",
        }
    }

    /// All node types in section order
    pub fn all() -> &'static [NodeType] {
        &[
            Self::Person,
            Self::Vendor,
            Self::Task,
            Self::Preference,
            Self::Event,
            Self::Spending,
            Self::Location,
            Self::Date,
        ]
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite node id: the source table plus the source record id
///
/// Rendered as `kind:source_id`. Keying on the record kind rather than the
/// node type keeps preferences and learned preferences (or events and
/// visits) from colliding when their source ids coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: RecordKind,
    pub source_id: String,
}

impl NodeKey {
    pub fn new(kind: RecordKind, source_id: impl Into<String>) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
        }
    }

    /// Key of a typed record
    pub fn of<T: HouseholdRecord>(record: &T) -> Self {
        Self::new(T::KIND, record.id())
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.source_id)
    }
}

impl FromStr for NodeKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, source_id) = s
            .split_once(':')
            .ok_or_else(|| format!("node key '{}' is missing a kind prefix", s))?;
        let kind =
            RecordKind::parse(kind).ok_or_else(|| format!("unknown record kind '{}'", kind))?;
        Ok(Self::new(kind, source_id))
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeKey,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    /// Source record fields, in declaration order
    pub attributes: Map<String, Value>,
}

impl GraphNode {
    /// Build a node from a typed record
    pub fn from_record<T: HouseholdRecord>(record: &T) -> Self {
        let attributes = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Self {
            id: NodeKey::of(record),
            node_type: T::KIND.node_type(),
            label: record.label(),
            attributes,
        }
    }

    /// String attribute, ignoring blanks
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }

    /// Array attribute as strings, skipping non-string entries
    pub fn attr_list(&self, key: &str) -> Vec<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn attr_bool(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
