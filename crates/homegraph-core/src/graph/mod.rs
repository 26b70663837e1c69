//! Household knowledge graph
//!
//! Nodes are household records; edges are relationships guessed from the
//! text of those records. A graph is rebuilt for every request and never
//! stored.

pub mod builder;
pub mod edge;
pub mod household;
pub mod node;
pub mod rules;

pub use builder::GraphBuilder;
pub use edge::{GraphEdge, Relation};
pub use household::{GraphSummary, HouseholdGraph};
pub use node::{GraphNode, NodeKey, NodeType};
pub use rules::{
    CleaningVendorPerformedService, DateBelongsToPerson, EdgeRule, EventAtLocation,
    PreferenceReferencesVendor, SpendingExpenseForTask, SpendingPaidToVendor, TaskInvolvesVendor,
    default_rules,
};
