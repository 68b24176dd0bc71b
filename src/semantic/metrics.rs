//! Metric availability validation.
//!
//! A metric is available iff every required field resolves against the
//! current model configuration, matching either the qualified
//! (`table.field`) or bare (`field`) spelling, case-insensitively.
//!
//! Bare-name matching is deliberately lenient: when two tables share a bare
//! column name, membership cannot tell which table satisfied the
//! requirement, so a metric can validate against a different table than its
//! author meant. Known limitation, preserved on purpose.

use std::collections::BTreeMap;

use crate::model::{FieldRef, Metric, ModelConfiguration, SchemaRegistry};

/// Result of validating one metric against a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricAvailability {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
}

/// Per-metric validation outcome, for flagging in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricStatus {
    pub metric_id: String,
    pub availability: MetricAvailability,
}

/// Check whether every required field of `metric` is present in the model.
///
/// A metric with zero required fields is trivially valid. Never fails.
pub fn validate_metric_availability(
    metric: &Metric,
    model: &ModelConfiguration,
) -> MetricAvailability {
    let available = model.field_set();

    let missing_fields: Vec<String> = metric
        .required_fields
        .iter()
        .filter(|required| !available.contains(required))
        .cloned()
        .collect();

    MetricAvailability {
        is_valid: missing_fields.is_empty(),
        missing_fields,
    }
}

/// For each missing field, the registry tables that could supply it.
///
/// Qualified names search only their named table; bare names search every
/// registry table. Fields with no candidate table are omitted from the map
/// entirely (callers must test membership, not truthiness of an empty list).
/// No registry means no suggestions.
pub fn missing_field_suggestions(
    missing_fields: &[String],
    registry: Option<&SchemaRegistry>,
) -> BTreeMap<String, Vec<String>> {
    let Some(registry) = registry else {
        return BTreeMap::new();
    };

    let mut suggestions = BTreeMap::new();

    for field in missing_fields {
        let fref = FieldRef::parse(field);
        let candidates: Vec<String> = match &fref.table {
            Some(table) => registry
                .table(table)
                .filter(|t| t.column(&fref.field).is_some())
                .map(|t| vec![t.name.clone()])
                .unwrap_or_default(),
            None => registry
                .tables_with_column(&fref.field)
                .into_iter()
                .map(String::from)
                .collect(),
        };

        if !candidates.is_empty() {
            suggestions.insert(field.clone(), candidates);
        }
    }

    suggestions
}

/// Validate a whole metric catalog against the model.
///
/// Unavailable metrics are flagged, never removed; metric validation warnings
/// must not block unrelated model operations.
pub fn metric_statuses(metrics: &[Metric], model: &ModelConfiguration) -> Vec<MetricStatus> {
    metrics
        .iter()
        .map(|metric| MetricStatus {
            metric_id: metric.id.clone(),
            availability: validate_metric_availability(metric, model),
        })
        .collect()
}

/// The metrics currently usable from pivot values.
pub fn available_metrics<'a>(
    metrics: &'a [Metric],
    model: &ModelConfiguration,
) -> Vec<&'a Metric> {
    metrics
        .iter()
        .filter(|m| validate_metric_availability(m, model).is_valid)
        .collect()
}
