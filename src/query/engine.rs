//! Lookup engine implementation
//!
//! Provides the read-only operations a front end needs:
//! - Listing primary and secondary options
//! - Resolving a typed value or display label back to its option
//! - Autocomplete over labels
//! - The usage card shown for a primary/secondary pair

use serde::Serialize;

use crate::Result;
use crate::option::{PrimaryOption, SecondaryOption};
use crate::storage::CatalogStore;

/// Usage text for one secondary option, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageCard {
    pub primary: PrimaryOption,
    pub secondary: SecondaryOption,
    pub usage: String,
    /// `None` when the stored note is empty, so callers can hide it
    pub note: Option<String>,
}

impl UsageCard {
    fn new(primary: PrimaryOption, secondary: SecondaryOption) -> Self {
        let usage = secondary.usage.clone();
        let note = secondary.has_note().then(|| secondary.note.clone());
        Self {
            primary,
            secondary,
            usage,
            note,
        }
    }
}

/// Lookup engine over a catalog store
pub struct LookupEngine<'a> {
    store: &'a CatalogStore,
}

impl<'a> LookupEngine<'a> {
    /// Create a new lookup engine
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    pub fn list_primary_options(&self) -> Result<Vec<PrimaryOption>> {
        self.store.list_primary_options()
    }

    pub fn list_secondary_options(&self, primary_value: &str) -> Result<Vec<SecondaryOption>> {
        self.store.list_secondary_options(primary_value)
    }

    /// Find a primary option by value, falling back to its display label
    pub fn resolve_primary(&self, input: &str) -> Result<Option<PrimaryOption>> {
        let options = self.store.list_primary_options()?;
        Ok(pick(options, input, |o| (&o.value, &o.label)))
    }

    /// Find a secondary option of `primary_value` by value, falling back to
    /// its display label
    pub fn resolve_secondary(&self, primary_value: &str, input: &str) -> Result<Option<SecondaryOption>> {
        let options = self.store.list_secondary_options(primary_value)?;
        Ok(pick(options, input, |o| (&o.value, &o.label)))
    }

    /// Primary options whose label completes `prefix`
    ///
    /// Matching is case-insensitive and accepts a prefix of the whole label
    /// or of any space-separated word in it. An empty prefix matches all.
    pub fn complete_primary(&self, prefix: &str) -> Result<Vec<PrimaryOption>> {
        let options = self.store.list_primary_options()?;
        Ok(options
            .into_iter()
            .filter(|o| label_matches(&o.label, prefix))
            .collect())
    }

    /// Secondary options of `primary_value` whose label completes `prefix`
    pub fn complete_secondary(&self, primary_value: &str, prefix: &str) -> Result<Vec<SecondaryOption>> {
        let options = self.store.list_secondary_options(primary_value)?;
        Ok(options
            .into_iter()
            .filter(|o| label_matches(&o.label, prefix))
            .collect())
    }

    /// Usage for a primary/secondary pair, each given by value or label.
    /// `None` if either side does not resolve.
    pub fn usage_card(&self, primary_input: &str, secondary_input: &str) -> Result<Option<UsageCard>> {
        let Some(primary) = self.resolve_primary(primary_input)? else {
            return Ok(None);
        };
        let secondary = self.resolve_secondary(&primary.value, secondary_input)?;
        Ok(secondary.map(|secondary| UsageCard::new(primary, secondary)))
    }
}

/// Exact value match wins over exact label match
fn pick<T>(options: Vec<T>, input: &str, key: impl Fn(&T) -> (&String, &String)) -> Option<T> {
    let by_value = options.iter().position(|o| key(o).0 == input);
    let index = by_value.or_else(|| options.iter().position(|o| key(o).1 == input))?;
    options.into_iter().nth(index)
}

fn label_matches(label: &str, prefix: &str) -> bool {
    let prefix = prefix.to_lowercase();
    if prefix.is_empty() {
        return true;
    }

    let label = label.to_lowercase();
    label.starts_with(&prefix) || label.split(' ').any(|word| word.starts_with(&prefix))
}
