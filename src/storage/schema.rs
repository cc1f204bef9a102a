//! Database schema definitions

/// Version stamped into `PRAGMA user_version`. Any change drops and
/// recreates the catalog tables.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL to create the primary_options table
pub const CREATE_PRIMARY_OPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS primary_options (
    value TEXT PRIMARY KEY,
    label TEXT NOT NULL
)
"#;

/// SQL to create the secondary_options table
/// `usage` and `note` are nullable; readers map NULL to an empty string
pub const CREATE_SECONDARY_OPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS secondary_options (
    value TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    usage TEXT,
    note TEXT,
    primary_value TEXT NOT NULL,
    FOREIGN KEY (primary_value) REFERENCES primary_options(value)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_secondary_primary ON secondary_options(primary_value)",
];

/// Children first, so the foreign key never points at a dropped table
pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS secondary_options",
    "DROP TABLE IF EXISTS primary_options",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_PRIMARY_OPTIONS_TABLE, CREATE_SECONDARY_OPTIONS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
