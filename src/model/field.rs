//! Field references, keys, and display labels.
//!
//! Fields travel through the engine in two spellings: bare (`title`) and
//! table-qualified (`film.title`). Aliases and metadata are keyed by the
//! qualified form.

use inflector::Inflector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display aliases keyed by `table.field`. Purely cosmetic - aliases never
/// change the generated SQL's logical structure, only AS labels.
pub type FieldAliases = BTreeMap<String, String>;

/// The inferred role of a column, used to pick default aggregation and
/// filter operator sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Dimension,
    Measure,
    Identifier,
    Date,
}

/// Per-field metadata, keyed by `table.field`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<SemanticType>,
}

/// A possibly table-qualified field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub table: Option<String>,
    pub field: String,
}

impl FieldRef {
    /// Parse `"film.title"` into a qualified reference, `"title"` into a
    /// bare one. Only the first dot splits; schema-qualified names keep the
    /// remainder as the field.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((table, field)) => Self {
                table: Some(table.to_string()),
                field: field.to_string(),
            },
            None => Self {
                table: None,
                field: raw.to_string(),
            },
        }
    }

    /// The `table.field` key, when qualified.
    pub fn qualified_key(&self) -> Option<String> {
        self.table.as_ref().map(|t| field_key(t, &self.field))
    }
}

/// Build the canonical `table.field` key.
pub fn field_key(table: &str, field: &str) -> String {
    format!("{table}.{field}")
}

/// Prettify a technical field name into a human-readable label.
///
/// `first_name` -> `First Name`, `customer.last_name` -> `Last Name`.
pub fn prettify_field_name(field: &str) -> String {
    let bare = FieldRef::parse(field).field;
    bare.to_title_case()
}
