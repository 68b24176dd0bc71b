//! Schema registry types.
//!
//! The registry is supplied by an external collaborator and describes every
//! table the data source offers, selected or not. It feeds missing-field
//! suggestions and the context builder's expansion hints.

use serde::{Deserialize, Serialize};

use super::field::SemanticType;

/// A foreign-key pointer recorded on a registry column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// A column as described by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<SemanticType>,
}

/// A table as described by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<RegisteredColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RegisteredTable {
    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&RegisteredColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// The full registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    pub tables: Vec<RegisteredTable>,
}

impl SchemaRegistry {
    /// Case-insensitive table lookup.
    pub fn table(&self, name: &str) -> Option<&RegisteredTable> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// All tables containing a column with the given name (case-insensitive),
    /// keeping the registry's original table-name casing.
    pub fn tables_with_column(&self, column: &str) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| t.column(column).is_some())
            .map(|t| t.name.as_str())
            .collect()
    }
}
