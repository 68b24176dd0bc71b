//! Calculated metrics.
//!
//! A metric is a named, reusable calculated field. Raw-SQL metrics carry an
//! opaque trusted fragment substituted verbatim into SELECT lists; formula
//! metrics are additionally parse-checked at creation time so a broken
//! expression is rejected before it can ever reach a generated query.

use serde::{Deserialize, Serialize};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use thiserror::Error;

/// How the formula string is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Opaque trusted SQL fragment.
    #[default]
    RawSql,
    /// Constrained expression, validated by parsing at creation.
    Formula,
}

/// Display format hint for metric results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricFormat {
    Currency,
    Percent,
    Number,
}

/// Errors raised when constructing or validating a metric.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetricError {
    #[error("metric '{0}' has an empty formula")]
    EmptyFormula(String),

    #[error("metric '{name}' formula does not parse: {message}")]
    FormulaSyntax { name: String, message: String },

    #[error("metric '{0}' formula is not a single expression")]
    NotAnExpression(String),
}

/// A calculated metric definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub name: String,
    /// SQL expression, e.g. `SUM(sales) - SUM(cost)`. Aggregation is baked
    /// in; the compiler never wraps a metric in another aggregate.
    pub formula: String,
    /// Field names (bare or `table.field`) the formula needs from the model.
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MetricFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_intelligence: Option<String>,
    #[serde(default)]
    pub kind: MetricKind,
}

impl Metric {
    /// Validate the formula for its kind.
    ///
    /// Raw-SQL metrics only need a non-empty fragment. Formula metrics must
    /// parse as exactly one SELECT-list expression.
    pub fn validate(&self) -> Result<(), MetricError> {
        if self.formula.trim().is_empty() {
            return Err(MetricError::EmptyFormula(self.name.clone()));
        }
        if self.kind == MetricKind::Formula {
            self.parse_formula()?;
        }
        Ok(())
    }

    fn parse_formula(&self) -> Result<(), MetricError> {
        // Wrap in a SELECT so sqlparser sees a complete statement.
        let probe = format!("SELECT {}", self.formula);
        let statements = Parser::parse_sql(&GenericDialect {}, &probe).map_err(|e| {
            MetricError::FormulaSyntax {
                name: self.name.clone(),
                message: e.to_string(),
            }
        })?;
        match statements.as_slice() {
            [sqlparser::ast::Statement::Query(query)] => {
                if let sqlparser::ast::SetExpr::Select(select) = query.body.as_ref() {
                    if select.projection.len() == 1 {
                        return Ok(());
                    }
                }
                Err(MetricError::NotAnExpression(self.name.clone()))
            }
            _ => Err(MetricError::NotAnExpression(self.name.clone())),
        }
    }
}
