//! Catalog types
//!
//! The catalog has two levels:
//! - `PrimaryOption`: a Git command family (`commit`, `push`, ...)
//! - `SecondaryOption`: a sub-command, flag or usage variant of one primary

use serde::{Deserialize, Serialize};

/// A top-level Git command family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryOption {
    /// Stable identifier, unique across primaries
    pub value: String,
    /// Display name
    pub label: String,
}

impl PrimaryOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A sub-command, flag or usage variant scoped to one primary option.
///
/// `usage` and `note` are never missing: an absent value is surfaced as an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryOption {
    /// Identifier, unique across all secondaries
    pub value: String,
    /// Display name
    pub label: String,
    /// Example invocation, e.g. `git commit --amend`
    pub usage: String,
    /// Supplementary note
    pub note: String,
    /// Value of the owning `PrimaryOption`
    pub primary_value: String,
}

impl SecondaryOption {
    pub fn has_note(&self) -> bool {
        !self.note.is_empty()
    }
}

/// Row counts of the catalog tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub primary: usize,
    pub secondary: usize,
}

impl CatalogStats {
    pub fn is_empty(&self) -> bool {
        self.primary == 0 && self.secondary == 0
    }
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Primary options: {}", self.primary)?;
        writeln!(f, "  Secondary options: {}", self.secondary)
    }
}
