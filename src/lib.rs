//! # githelp - Git command explorer
//!
//! A two-level catalog of Git commands kept in an embedded SQLite store:
//! primary command (e.g. `commit`) → secondary option (e.g. `--amend`) →
//! usage text and an optional note.
//!
//! githelp provides:
//! - A versioned SQLite store with drop-and-recreate upgrades
//! - Atomic bulk load from a JSON catalog document
//! - A read-only lookup engine with autocomplete and label resolution

pub mod option;
pub mod document;
pub mod storage;
pub mod query;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use option::{CatalogStats, PrimaryOption, SecondaryOption};
pub use document::CatalogDocument;
pub use storage::{CatalogStore, LoadStats, SCHEMA_VERSION};
pub use query::{LookupEngine, UsageCard};

use std::path::PathBuf;

/// Result type alias for githelp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DDL or pragma failure; the store cannot be used
    #[error("Schema error: {0}")]
    Schema(#[source] rusqlite::Error),

    /// The catalog document could not be loaded; the store remains usable
    #[error("Data load error: {0}")]
    DataLoad(#[from] LoadError),

    /// Storage fault outside of schema changes and row inserts: a read,
    /// opening a transaction, or releasing the connection
    #[error("Query error: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Catalog store is closed")]
    Closed,
}

/// Reasons a bulk load can fail
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A row was refused by the store; the whole load was rolled back
    #[error("rejected by store, nothing was committed: {0}")]
    Rejected(#[source] rusqlite::Error),
}

impl Error {
    /// True for failures that leave the store usable (load problems)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DataLoad(_))
    }
}
