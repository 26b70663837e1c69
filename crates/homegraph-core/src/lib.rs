//! Homegraph Core Library
//!
//! This crate provides the core functionality for Homegraph, including:
//! - Household records and a fail-closed concurrent loader
//! - The household knowledge graph and its edge rules
//! - Context serialization, relevance retrieval and connection mining
//! - Question answering (OpenRouter model with a rule-based fallback)
//! - Storage (SQLite record store)
//! - Configuration

pub mod answer;
pub mod config;
pub mod connections;
pub mod context;
pub mod dates;
pub mod engine;
pub mod error;
pub mod graph;
pub mod llm;
pub mod records;
pub mod retrieval;
pub mod storage;

pub use engine::{AskResult, HouseholdEngine, SourceRef};
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::engine::{AskResult, HouseholdEngine};
    pub use crate::error::{Error, Result};
    pub use crate::graph::{GraphNode, HouseholdGraph, NodeType};
    pub use crate::records::{HouseholdRecordStore, HouseholdRecords, MemoryRecordStore};
    pub use crate::storage::{Database, SqliteRecordStore};
}
