//! SQLite storage implementation

use std::path::Path;

use rusqlite::{params, Connection};

use super::schema::{self, SCHEMA_VERSION};
use crate::document::CatalogDocument;
use crate::option::{CatalogStats, PrimaryOption, SecondaryOption};
use crate::{Error, LoadError, Result};

/// SQLite-backed storage for the command catalog.
///
/// Owns a single connection for its whole lifetime. Writers take `&mut self`,
/// so a store can only be populated or upgraded while nothing else borrows it.
/// The connection is released by `close()` or on drop.
#[derive(Debug)]
pub struct CatalogStore {
    conn: Option<Connection>,
}

impl CatalogStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_version(path, SCHEMA_VERSION)
    }

    /// Open a database file and reconcile it against `version`.
    ///
    /// A fresh file is created and stamped, a matching one is left as is, and
    /// one stamped with any other version is dropped and recreated empty.
    pub fn open_with_version(path: &Path, version: u32) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::Schema)?;
        tracing::debug!("Opened catalog store at {}", path.display());
        Self::from_connection(conn, version)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Schema)?;
        Self::from_connection(conn, SCHEMA_VERSION)
    }

    fn from_connection(conn: Connection, version: u32) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(Error::Schema)?;

        let mut store = Self { conn: Some(conn) };
        store.reconcile_version(version)?;
        Ok(store)
    }

    fn reconcile_version(&mut self, version: u32) -> Result<()> {
        let stored = self.schema_version()?;
        if stored == 0 {
            self.initialize_schema()?;
            self.conn()?
                .pragma_update(None, "user_version", version)
                .map_err(Error::Schema)?;
            tracing::debug!(version, "Created catalog schema");
        } else if stored != version {
            self.upgrade(stored, version)?;
        } else {
            self.initialize_schema()?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::Closed)
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(Error::Closed)
    }

    // ========== Schema Lifecycle ==========

    /// Create the catalog tables if they are missing. Never clears data.
    pub fn initialize_schema(&self) -> Result<()> {
        create_tables(self.conn()?)
    }

    /// Schema version stamped in the database file
    pub fn schema_version(&self) -> Result<u32> {
        self.conn()?
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(Error::Schema)
    }

    /// Drop both tables and recreate them empty, stamped with `new_version`.
    ///
    /// The catalog is a rebuildable cache of static data, so there is no
    /// incremental migration: every version change loses all rows.
    pub fn upgrade(&mut self, old_version: u32, new_version: u32) -> Result<()> {
        tracing::info!(old_version, new_version, "Recreating catalog schema, existing data is dropped");

        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(Error::Schema)?;
        for stmt in schema::DROP_TABLES {
            tx.execute(stmt, []).map_err(Error::Schema)?;
        }
        create_tables(&tx)?;
        tx.pragma_update(None, "user_version", new_version)
            .map_err(Error::Schema)?;
        tx.commit().map_err(Error::Schema)?;
        Ok(())
    }

    /// Empty the catalog without changing the schema version
    pub fn reset(&mut self) -> Result<()> {
        let version = self.schema_version()?;
        self.upgrade(version, version)
    }

    // ========== Bulk Load ==========

    /// Insert every row of `document` in a single transaction.
    ///
    /// Any rejected row (duplicate value, secondary key without a primary
    /// option) rolls back the whole load. Not idempotent: loading into a
    /// populated store fails on the first duplicate and keeps the old rows.
    pub fn populate(&mut self, document: &CatalogDocument) -> Result<LoadStats> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(Error::Query)?;
        let stats = insert_document(&tx, document)?;
        tx.commit().map_err(rejected)?;
        tracing::info!(primary = stats.primary, secondary = stats.secondary, "Catalog populated");
        Ok(stats)
    }

    /// Swap the whole catalog for `document` in one transaction.
    ///
    /// Tables are dropped, recreated and filled together, so a rejected row
    /// leaves the previous catalog untouched.
    pub fn replace(&mut self, document: &CatalogDocument) -> Result<LoadStats> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(Error::Query)?;
        for stmt in schema::DROP_TABLES {
            tx.execute(stmt, []).map_err(Error::Schema)?;
        }
        create_tables(&tx)?;
        let stats = insert_document(&tx, document)?;
        tx.commit().map_err(rejected)?;
        tracing::info!(primary = stats.primary, secondary = stats.secondary, "Catalog replaced");
        Ok(stats)
    }

    /// Load a document from disk and populate the store with it.
    ///
    /// A missing file is logged and loads nothing.
    pub fn populate_from_path(&mut self, path: &Path) -> Result<LoadStats> {
        match CatalogDocument::read(path)? {
            Some(document) => self.populate(&document),
            None => Ok(LoadStats::default()),
        }
    }

    // ========== Queries ==========

    /// All primary options, in load order
    pub fn list_primary_options(&self) -> Result<Vec<PrimaryOption>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value, label FROM primary_options ORDER BY rowid")
            .map_err(Error::Query)?;

        let options = stmt
            .query_map([], |row| {
                Ok(PrimaryOption {
                    value: row.get(0)?,
                    label: row.get(1)?,
                })
            })
            .map_err(Error::Query)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::Query)?;

        Ok(options)
    }

    /// Secondary options whose `primary_value` equals the argument exactly,
    /// in load order. An unknown primary yields an empty list.
    pub fn list_secondary_options(&self, primary_value: &str) -> Result<Vec<SecondaryOption>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT value, label, usage, note, primary_value FROM secondary_options WHERE primary_value = ?1 ORDER BY rowid",
            )
            .map_err(Error::Query)?;

        let options = stmt
            .query_map([primary_value], row_to_secondary)
            .map_err(Error::Query)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::Query)?;

        Ok(options)
    }

    /// Count primary options
    pub fn count_primary(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM primary_options")
    }

    /// Count secondary options
    pub fn count_secondary(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM secondary_options")
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row(sql, [], |row| row.get(0))
            .map_err(Error::Query)?;
        Ok(count as usize)
    }

    /// Get catalog statistics
    pub fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            primary: self.count_primary()?,
            secondary: self.count_secondary()?,
        })
    }

    /// True when nothing has been loaded yet
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.stats()?.is_empty())
    }

    // ========== Lifecycle ==========

    /// Release the connection. Calling it again is a no-op; every other
    /// operation returns `Error::Closed` afterwards. A failure to close is a
    /// storage fault and surfaces as `Error::Query`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| Error::Query(e))?;
            tracing::debug!("Closed catalog store");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

fn insert_document(conn: &Connection, document: &CatalogDocument) -> Result<LoadStats> {
    let mut stats = LoadStats::default();

    let mut insert_primary = conn
        .prepare("INSERT INTO primary_options (value, label) VALUES (?1, ?2)")
        .map_err(rejected)?;
    for primary in &document.primary_options {
        insert_primary
            .execute(params![primary.value, primary.label])
            .map_err(rejected)?;
        stats.primary += 1;
    }

    let mut insert_secondary = conn
        .prepare(
            r#"
            INSERT INTO secondary_options (value, label, usage, note, primary_value)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .map_err(rejected)?;
    for (primary_value, entries) in &document.secondary_options {
        for secondary in entries {
            insert_secondary
                .execute(params![
                    secondary.value,
                    secondary.label,
                    secondary.usage,
                    secondary.note,
                    primary_value,
                ])
                .map_err(rejected)?;
            stats.secondary += 1;
        }
    }

    Ok(stats)
}

fn create_tables(conn: &Connection) -> Result<()> {
    for stmt in schema::all_schema_statements() {
        conn.execute(stmt, []).map_err(Error::Schema)?;
    }
    Ok(())
}

fn rejected(e: rusqlite::Error) -> Error {
    LoadError::Rejected(e).into()
}

/// Helper to convert a row to a SecondaryOption
fn row_to_secondary(row: &rusqlite::Row<'_>) -> rusqlite::Result<SecondaryOption> {
    let usage: Option<String> = row.get(2)?;
    let note: Option<String> = row.get(3)?;

    Ok(SecondaryOption {
        value: row.get(0)?,
        label: row.get(1)?,
        usage: usage.unwrap_or_default(),
        note: note.unwrap_or_default(),
        primary_value: row.get(4)?,
    })
}

/// Rows inserted by one bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub primary: usize,
    pub secondary: usize,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} primary options, {} secondary options",
            self.primary, self.secondary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "primary_options": [{"value": "commit", "label": "Commit"}],
        "secondary_options": {
            "commit": [{"value": "commit_amend", "label": "--amend", "usage": "git commit --amend"}]
        }
    }"#;

    fn doc(json: &str) -> CatalogDocument {
        CatalogDocument::from_json_str(json).unwrap()
    }

    fn loaded(json: &str) -> CatalogStore {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.populate(&doc(json)).unwrap();
        store
    }

    #[test]
    fn test_scenario_lookup() {
        let store = loaded(SCENARIO);

        assert_eq!(
            store.list_primary_options().unwrap(),
            vec![PrimaryOption::new("commit", "Commit")]
        );
        assert_eq!(
            store.list_secondary_options("commit").unwrap(),
            vec![SecondaryOption {
                value: "commit_amend".into(),
                label: "--amend".into(),
                usage: "git commit --amend".into(),
                note: String::new(),
                primary_value: "commit".into(),
            }]
        );
        assert!(store.list_secondary_options("push").unwrap().is_empty());
    }

    #[test]
    fn test_fresh_store_is_empty_and_versioned() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert!(store.list_primary_options().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_schema_keeps_data() {
        let store = loaded(SCENARIO);
        store.initialize_schema().unwrap();
        assert_eq!(store.count_primary().unwrap(), 1);
        assert_eq!(store.count_secondary().unwrap(), 1);
    }

    #[test]
    fn test_missing_usage_and_note_are_empty() {
        let store = loaded(
            r#"{
                "primary_options": [{"value": "stash", "label": "Stash"}],
                "secondary_options": {
                    "stash": [
                        {"value": "stash_bare", "label": "bare"},
                        {"value": "stash_pop", "label": "pop", "usage": "git stash pop", "nb": "Drops the stash"}
                    ]
                }
            }"#,
        );

        let options = store.list_secondary_options("stash").unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].usage, "");
        assert_eq!(options[0].note, "");
        assert!(!options[0].has_note());
        assert_eq!(options[1].usage, "git stash pop");
        assert_eq!(options[1].note, "Drops the stash");
    }

    #[test]
    fn test_values_round_trip_verbatim() {
        let store = loaded(
            r#"{
                "primary_options": [{"value": " Log ", "label": "  LOG --Oneline\t"}],
                "secondary_options": {
                    " Log ": [{"value": "ÄÖ", "label": " Mixed Case ", "usage": "git log  --oneline "}]
                }
            }"#,
        );

        let primary = &store.list_primary_options().unwrap()[0];
        assert_eq!(primary.value, " Log ");
        assert_eq!(primary.label, "  LOG --Oneline\t");

        // matching is exact, not trimmed or case-folded
        assert!(store.list_secondary_options("Log").unwrap().is_empty());
        assert!(store.list_secondary_options(" log ").unwrap().is_empty());

        let secondary = &store.list_secondary_options(" Log ").unwrap()[0];
        assert_eq!(secondary.value, "ÄÖ");
        assert_eq!(secondary.label, " Mixed Case ");
        assert_eq!(secondary.usage, "git log  --oneline ");
    }

    #[test]
    fn test_listing_follows_document_order() {
        let store = loaded(
            r#"{
                "primary_options": [
                    {"value": "push", "label": "Push"},
                    {"value": "add", "label": "Add"},
                    {"value": "merge", "label": "Merge"}
                ],
                "secondary_options": {
                    "push": [
                        {"value": "push_z", "label": "z"},
                        {"value": "push_a", "label": "a"}
                    ]
                }
            }"#,
        );

        let values: Vec<_> = store
            .list_primary_options()
            .unwrap()
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, ["push", "add", "merge"]);

        let labels: Vec<_> = store
            .list_secondary_options("push")
            .unwrap()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, ["z", "a"]);
    }

    #[test]
    fn test_duplicate_primary_rejects_whole_load() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = store
            .populate(&doc(
                r#"{
                    "primary_options": [
                        {"value": "commit", "label": "Commit"},
                        {"value": "commit", "label": "Commit again"}
                    ],
                    "secondary_options": {}
                }"#,
            ))
            .unwrap_err();

        assert!(matches!(err, Error::DataLoad(LoadError::Rejected(_))));
        assert!(err.is_recoverable());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_secondary_without_primary_is_rejected() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = store
            .populate(&doc(
                r#"{
                    "primary_options": [{"value": "commit", "label": "Commit"}],
                    "secondary_options": {
                        "push": [{"value": "push_tags", "label": "--tags"}]
                    }
                }"#,
            ))
            .unwrap_err();

        assert!(matches!(err, Error::DataLoad(LoadError::Rejected(_))));
        // the valid primary row was rolled back too
        assert!(store.list_primary_options().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_secondary_value_rejects_whole_load() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = store
            .populate(&doc(
                r#"{
                    "primary_options": [
                        {"value": "a", "label": "A"},
                        {"value": "b", "label": "B"}
                    ],
                    "secondary_options": {
                        "a": [{"value": "x", "label": "x under a"}],
                        "b": [{"value": "x", "label": "x under b"}]
                    }
                }"#,
            ))
            .unwrap_err();

        assert!(matches!(err, Error::DataLoad(LoadError::Rejected(_))));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_replace_swaps_catalog() {
        let mut store = loaded(SCENARIO);
        let stats = store
            .replace(&doc(
                r#"{
                    "primary_options": [{"value": "push", "label": "Push"}],
                    "secondary_options": {
                        "push": [{"value": "push_tags", "label": "--tags"}]
                    }
                }"#,
            ))
            .unwrap();

        assert_eq!(stats, LoadStats { primary: 1, secondary: 1 });
        assert_eq!(
            store.list_primary_options().unwrap(),
            vec![PrimaryOption::new("push", "Push")]
        );
        assert!(store.list_secondary_options("commit").unwrap().is_empty());
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_failed_replace_keeps_old_catalog() {
        let mut store = loaded(SCENARIO);
        let err = store
            .replace(&doc(
                r#"{
                    "primary_options": [{"value": "push", "label": "Push"}],
                    "secondary_options": {
                        "pull": [{"value": "pull_rebase", "label": "--rebase"}]
                    }
                }"#,
            ))
            .unwrap_err();

        assert!(matches!(err, Error::DataLoad(LoadError::Rejected(_))));
        assert_eq!(
            store.list_primary_options().unwrap(),
            vec![PrimaryOption::new("commit", "Commit")]
        );
        assert_eq!(store.list_secondary_options("commit").unwrap().len(), 1);
    }

    #[test]
    fn test_transaction_begin_failure_is_query_error() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        // a transaction is already open, so BEGIN fails
        store.conn.as_ref().unwrap().execute_batch("BEGIN").unwrap();

        let err = store.populate(&doc(SCENARIO)).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert!(!err.is_recoverable());

        let err = store.replace(&doc(SCENARIO)).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_populate_twice_fails_and_keeps_first_load() {
        let mut store = loaded(SCENARIO);
        let err = store.populate(&doc(SCENARIO)).unwrap_err();
        assert!(matches!(err, Error::DataLoad(LoadError::Rejected(_))));

        let stats = store.stats().unwrap();
        assert_eq!(stats.primary, 1);
        assert_eq!(stats.secondary, 1);
    }

    #[test]
    fn test_upgrade_empties_tables() {
        let mut store = loaded(SCENARIO);
        store.upgrade(1, 2).unwrap();

        assert_eq!(store.schema_version().unwrap(), 2);
        assert!(store.list_primary_options().unwrap().is_empty());
        assert!(store.list_secondary_options("commit").unwrap().is_empty());

        // tables exist again and accept a fresh load
        let stats = store.populate(&doc(SCENARIO)).unwrap();
        assert_eq!(stats, LoadStats { primary: 1, secondary: 1 });
    }

    #[test]
    fn test_reset_keeps_version() {
        let mut store = loaded(SCENARIO);
        store.reset().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut store = loaded(SCENARIO);
        store.close().unwrap();
        store.close().unwrap();

        assert!(store.is_closed());
        assert!(matches!(store.list_primary_options(), Err(Error::Closed)));
        assert!(matches!(store.populate(&doc(SCENARIO)), Err(Error::Closed)));
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let document = CatalogDocument::builtin().unwrap();
        let stats = store.populate(&document).unwrap();

        assert_eq!(stats.primary, document.primary_count());
        assert_eq!(stats.secondary, document.secondary_count());
        assert_eq!(store.list_secondary_options("commit").unwrap().len(), 3);
    }
}
