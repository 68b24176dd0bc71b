//! Discovered tables and the model configuration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::field::{field_key, FieldRef};

/// A physical table reported by schema discovery, with the columns known to
/// exist on it. Immutable once fetched; refreshed wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredTable {
    pub name: String,
    pub fields: Vec<String>,
}

impl DiscoveredTable {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Mapping from table name to the fields selected from it.
///
/// Stored as a `BTreeMap` so every traversal (driving-table choice, SELECT
/// list order, field resolution) is deterministic and recompilation of
/// identical inputs yields byte-identical SQL. "Declaration order" is
/// therefore lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelConfiguration(pub BTreeMap<String, Vec<String>>);

impl ModelConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.0.contains_key(table)
    }

    /// Table names in deterministic order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn fields(&self, table: &str) -> Option<&[String]> {
        self.0.get(table).map(Vec::as_slice)
    }

    pub fn insert_table(&mut self, table: &str, fields: Vec<String>) {
        self.0.insert(table.to_string(), fields);
    }

    pub fn remove_table(&mut self, table: &str) {
        self.0.remove(table);
    }

    /// Union of bare field names across all tables.
    pub fn all_fields(&self) -> BTreeSet<&str> {
        self.0
            .values()
            .flat_map(|fields| fields.iter().map(String::as_str))
            .collect()
    }

    /// The owning table for a field reference.
    ///
    /// Qualified references resolve directly when the table and field are in
    /// the model. Bare references resolve to the first model table (in
    /// deterministic order) that selects the field - when two tables share a
    /// bare column name, first match wins; the ambiguity is not flagged.
    pub fn table_for_field(&self, field: &str) -> Option<&str> {
        let fref = FieldRef::parse(field);
        if let Some(table) = &fref.table {
            if let Some(fields) = self.0.get(table) {
                if fields.iter().any(|f| f == &fref.field) {
                    return self.0.get_key_value(table).map(|(k, _)| k.as_str());
                }
            }
            return None;
        }
        self.0
            .iter()
            .find(|(_, fields)| fields.iter().any(|f| f == &fref.field))
            .map(|(table, _)| table.as_str())
    }

    /// Membership set for model fields: every selected field in both its
    /// qualified (`table.field`) and bare (`field`) lower-cased spellings.
    pub fn field_set(&self) -> FieldSet {
        let mut entries = BTreeSet::new();
        for (table, fields) in &self.0 {
            for field in fields {
                entries.insert(field_key(table, field).to_lowercase());
                entries.insert(field.to_lowercase());
            }
        }
        FieldSet { entries }
    }
}

/// Lower-cased membership set over a model's fields, holding both qualified
/// and bare spellings of every entry.
///
/// Bare-name membership cannot distinguish which table a field came from, so
/// a bare match may be satisfied by a different table than the author meant.
/// This leniency is deliberate and load-bearing for metric validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    entries: BTreeSet<String>,
}

impl FieldSet {
    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains(&field.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
