//! Row filters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::SemanticType;

/// Filter comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

impl FilterOperator {
    /// Operators permitted for a field of the given semantic type.
    ///
    /// Measures are numeric and take range comparisons; everything else is
    /// treated as text and takes equality/containment.
    pub fn allowed_for(semantic_type: SemanticType) -> &'static [FilterOperator] {
        match semantic_type {
            SemanticType::Measure => &[
                FilterOperator::Equals,
                FilterOperator::GreaterThan,
                FilterOperator::LessThan,
            ],
            _ => &[FilterOperator::Equals, FilterOperator::Contains],
        }
    }
}

/// A filter value: numbers bind unquoted, text is quoted and escaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FilterValue::Number(_))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

/// A single row filter. Multiple filters are ANDed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    /// Create a filter with a fresh id.
    pub fn new(field: &str, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    /// Is this operator/type combination permitted?
    pub fn is_operator_allowed(&self, semantic_type: SemanticType) -> bool {
        FilterOperator::allowed_for(semantic_type).contains(&self.operator)
    }
}
