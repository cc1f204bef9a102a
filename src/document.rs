//! Catalog document - the JSON source of a bulk load
//!
//! ```json
//! {
//!   "primary_options": [ { "value": "commit", "label": "Commit" } ],
//!   "secondary_options": {
//!     "commit": [ { "value": "commit_amend", "label": "--amend", "usage": "git commit --amend", "nb": "..." } ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{LoadError, Result};

/// Catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../data/git_command_explorer.json");

/// A primary entry of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryEntry {
    pub value: String,
    pub label: String,
}

/// A secondary entry of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEntry {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, rename = "nb", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Parsed bulk-load document.
///
/// Both top-level keys are required. Secondary entries are keyed by the
/// value of the primary option they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub primary_options: Vec<PrimaryEntry>,
    pub secondary_options: BTreeMap<String, Vec<SecondaryEntry>>,
}

impl CatalogDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document = serde_json::from_str(json).map_err(LoadError::Malformed)?;
        Ok(document)
    }

    /// Read a document from disk.
    ///
    /// A missing file is not an error: it is logged and reported as `None`.
    /// Any other read failure, or unparsable content, is a `DataLoad` error.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Catalog document {} not found, nothing to load", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(LoadError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };

        Self::from_json_str(&contents).map(Some)
    }

    /// The catalog bundled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn primary_count(&self) -> usize {
        self.primary_options.len()
    }

    pub fn secondary_count(&self) -> usize {
        self.secondary_options.values().map(Vec::len).sum()
    }
}
