//! Storage layer - SQLite
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//! - `records`: The SQLite household record store
//!
//! # Usage
//!
//! ```ignore
//! use homegraph_core::storage::{Database, SqliteRecordStore};
//!
//! let db = Database::open("homegraph.db").await?;
//! let store = SqliteRecordStore::from_database(&db);
//! store.import("household-1", &records).await?;
//! ```

pub mod database;
pub mod migrations;
pub mod records;

pub use database::{Database, DatabaseConfig, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
pub use records::{ImportSummary, SqliteRecordStore};
