//! Pivot configuration: rows x columns x aggregated values.

use serde::{Deserialize, Serialize};

use crate::sql::{func, Expr};

/// Aggregation applied to a pivot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Count => "COUNT",
            Aggregation::Avg => "AVG",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }

    /// Wrap an expression in this aggregate.
    pub fn apply(&self, expr: Expr) -> Expr {
        func(self.as_str(), vec![expr])
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One aggregated value in the pivot. `field` may name a physical field or a
/// metric id; metric ids take precedence when both exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotValue {
    pub field: String,
    pub aggregation: Aggregation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Drop zones a field can occupy. A field lives in at most one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotZone {
    Rows,
    Columns,
    Values,
}

/// A rows x columns x values pivot configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<PivotValue>,
}

impl PivotConfig {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty() && self.values.is_empty()
    }

    /// Every field the pivot references, group keys first, then values.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .chain(self.columns.iter())
            .map(String::as_str)
            .chain(self.values.iter().map(|v| v.field.as_str()))
    }

    /// Remove a field from every zone.
    pub fn remove_field(&mut self, field: &str) {
        self.rows.retain(|f| f != field);
        self.columns.retain(|f| f != field);
        self.values.retain(|v| v.field != field);
    }

    /// Move a field into a zone, clearing it from any prior zone first.
    pub fn assign_zone(&mut self, field: &str, zone: PivotZone, aggregation: Aggregation) {
        self.remove_field(field);
        match zone {
            PivotZone::Rows => self.rows.push(field.to_string()),
            PivotZone::Columns => self.columns.push(field.to_string()),
            PivotZone::Values => self.values.push(PivotValue {
                field: field.to_string(),
                aggregation,
                display_name: None,
            }),
        }
    }
}
