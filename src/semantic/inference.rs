//! Metadata inference from column names.
//!
//! Classifies a column into a semantic role using fixed naming
//! vocabularies. Pure, total, deterministic: every name classifies, with
//! `Dimension` as the fallback.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Aggregation, FieldRef, SemanticType};

/// Identifier shapes: `id`, `*_id`, `*_key`, uuid/guid columns.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^id$|_id$|_key$|uuid|guid)").unwrap());

/// Temporal vocabulary, including the `*_at` timestamp convention.
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(date|time|year|month|week|day|_at$)").unwrap());

/// Quantitative vocabulary.
static MEASURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(amount|price|cost|total|revenue|sales|profit|quantity|qty|salary|fee|balance|margin)")
        .unwrap()
});

/// Infer the semantic role of a column from its name.
///
/// Accepts bare (`total_jobs`) or qualified (`jobs.total_jobs`) spellings;
/// only the bare part is classified. Identifier and date shapes win over the
/// measure vocabulary so `order_date` and `price_id` classify by their
/// suffix, not their stem.
pub fn infer_semantic_type(field_name: &str) -> SemanticType {
    let bare = FieldRef::parse(field_name).field;
    if IDENTIFIER_PATTERN.is_match(&bare) {
        SemanticType::Identifier
    } else if DATE_PATTERN.is_match(&bare) {
        SemanticType::Date
    } else if MEASURE_PATTERN.is_match(&bare) {
        SemanticType::Measure
    } else {
        SemanticType::Dimension
    }
}

/// Default aggregation for a field dropped into the pivot's values zone.
pub fn default_aggregation(semantic_type: SemanticType) -> Aggregation {
    match semantic_type {
        SemanticType::Measure => Aggregation::Sum,
        _ => Aggregation::Count,
    }
}
