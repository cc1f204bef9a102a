//! Storage Layer - SQLite-backed catalog
//!
//! System of record is SQLite with tables:
//! - primary_options(value, label)
//! - secondary_options(value, label, usage, note, primary_value)
//!
//! The schema version lives in `PRAGMA user_version`.

pub mod schema;
pub mod sqlite;

pub use schema::SCHEMA_VERSION;
pub use sqlite::{CatalogStore, LoadStats};
