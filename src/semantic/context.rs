//! Tiered semantic context for the AI collaborator.
//!
//! Serializes the current model into a bounded text document. Tier 1 (active
//! model and joins) always survives; lower tiers are appended in priority
//! order while the character budget holds and are dropped whole once it
//! does not. Only Tier 1 may be hard-truncated, when it alone overflows.

use std::collections::{BTreeMap, BTreeSet};

use super::metrics::available_metrics;
use crate::model::{
    field_key, FieldMetadata, Join, Metric, ModelConfiguration, SchemaRegistry,
};

/// Default character budget for the assembled document.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

/// How many sample values to show per field.
const SAMPLES_PER_FIELD: usize = 5;

/// Inputs to context generation. Optional sections simply produce empty
/// tiers when absent.
#[derive(Debug, Clone)]
pub struct ContextInput<'a> {
    pub model: &'a ModelConfiguration,
    pub joins: &'a [Join],
    pub field_metadata: Option<&'a BTreeMap<String, FieldMetadata>>,
    pub metrics: Option<&'a [Metric]>,
    pub registry: Option<&'a SchemaRegistry>,
    pub sample_values: Option<&'a BTreeMap<String, Vec<String>>>,
    pub max_chars: Option<usize>,
}

struct ContextTier {
    priority: u8,
    content: String,
}

/// Generate the semantic context document.
pub fn build_semantic_context(input: &ContextInput) -> String {
    let max_chars = input.max_chars.unwrap_or(DEFAULT_MAX_CHARS);

    let tiers: Vec<ContextTier> = [
        tier1_active_model(input),
        tier2_metadata(input),
        tier3_metrics(input),
        tier4_registry(input),
        tier5_samples(input),
    ]
    .into_iter()
    .filter(|tier| !tier.content.is_empty())
    .collect();

    assemble_with_budget(tiers, max_chars)
}

/// Rough token estimate (1 token ~ 4 characters).
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// The `table.field` keys of every selected field.
fn model_field_keys(model: &ModelConfiguration) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for table in model.tables() {
        if let Some(fields) = model.fields(table) {
            for field in fields {
                keys.insert(field_key(table, field));
            }
        }
    }
    keys
}

/// Tier 1: active model (tables, fields, joins). Never dropped.
fn tier1_active_model(input: &ContextInput) -> ContextTier {
    let mut lines = vec!["## ACTIVE MODEL".to_string()];

    if input.model.is_empty() {
        lines.push("No tables selected.".to_string());
    } else {
        lines.push("### Tables & Fields".to_string());
        for table in input.model.tables() {
            let fields = input.model.fields(table).unwrap_or_default();
            lines.push(format!("- **{}**: {}", table, fields.join(", ")));
        }
    }

    if !input.joins.is_empty() {
        lines.push(String::new());
        lines.push("### Joins".to_string());
        for join in input.joins {
            lines.push(format!(
                "- {} {} {} ON {} = {}",
                join.from, join.join_type, join.to, join.on.from, join.on.to
            ));
        }
    }

    ContextTier {
        priority: 1,
        content: lines.join("\n"),
    }
}

/// Tier 2: field metadata, restricted to fields in the current model.
fn tier2_metadata(input: &ContextInput) -> ContextTier {
    let empty = ContextTier {
        priority: 2,
        content: String::new(),
    };
    let Some(metadata) = input.field_metadata else {
        return empty;
    };

    let model_fields = model_field_keys(input.model);
    let mut lines = vec![String::new(), "## FIELD METADATA".to_string()];

    for (field, meta) in metadata {
        if !model_fields.contains(field) {
            continue;
        }
        let mut parts = vec![format!("- **{field}**")];
        if let Some(data_type) = meta.data_type {
            parts.push(format!("[{data_type:?}]").to_lowercase());
        }
        if let Some(description) = &meta.description {
            if !description.is_empty() {
                parts.push(format!("- {description}"));
            }
        }
        if parts.len() > 1 {
            lines.push(parts.join(" "));
        }
    }

    if lines.len() <= 2 {
        return empty;
    }
    ContextTier {
        priority: 2,
        content: lines.join("\n"),
    }
}

/// Tier 3: the metric catalog, restricted to metrics the current model can
/// actually compute.
fn tier3_metrics(input: &ContextInput) -> ContextTier {
    let empty = ContextTier {
        priority: 3,
        content: String::new(),
    };
    let Some(metrics) = input.metrics.filter(|m| !m.is_empty()) else {
        return empty;
    };

    let usable = available_metrics(metrics, input.model);
    if usable.is_empty() {
        return empty;
    }

    let mut lines = vec![String::new(), "## AVAILABLE METRICS".to_string()];
    for metric in usable {
        let mut line = format!("- **{}**: `{}`", metric.name, metric.formula);
        if let Some(description) = &metric.description {
            line.push_str(&format!(" - {description}"));
        }
        lines.push(line);
    }

    ContextTier {
        priority: 3,
        content: lines.join("\n"),
    }
}

/// Tier 4: registry tables *not* in the model - expansion hints, with any
/// foreign-key relationships that could join them in.
fn tier4_registry(input: &ContextInput) -> ContextTier {
    let empty = ContextTier {
        priority: 4,
        content: String::new(),
    };
    let Some(registry) = input.registry else {
        return empty;
    };

    let candidates: Vec<_> = registry
        .tables
        .iter()
        .filter(|t| !input.model.contains_table(&t.name))
        .collect();
    if candidates.is_empty() {
        return empty;
    }

    let mut lines = vec![
        String::new(),
        "## OTHER AVAILABLE TABLES (In Registry)".to_string(),
        "Use these to suggest model expansions.".to_string(),
    ];

    for table in candidates {
        let fks: Vec<String> = table
            .columns
            .iter()
            .filter_map(|c| {
                c.foreign_key
                    .as_ref()
                    .map(|fk| format!("{} -> {}.{}", c.name, fk.table, fk.column))
            })
            .collect();
        let mut line = format!("- **{}**", table.name);
        if !fks.is_empty() {
            line.push_str(&format!(" (Relationships: {})", fks.join("; ")));
        }
        lines.push(line);
    }

    ContextTier {
        priority: 4,
        content: lines.join("\n"),
    }
}

/// Tier 5: sample values for fields in the current model.
fn tier5_samples(input: &ContextInput) -> ContextTier {
    let empty = ContextTier {
        priority: 5,
        content: String::new(),
    };
    let Some(samples) = input.sample_values else {
        return empty;
    };

    let model_fields = model_field_keys(input.model);
    let mut lines = vec![String::new(), "## SAMPLE VALUES".to_string()];

    for (field, values) in samples {
        if !model_fields.contains(field) || values.is_empty() {
            continue;
        }
        let shown: Vec<_> = values.iter().take(SAMPLES_PER_FIELD).cloned().collect();
        lines.push(format!("- {}: {}", field, shown.join(", ")));
    }

    if lines.len() <= 2 {
        return empty;
    }
    ContextTier {
        priority: 5,
        content: lines.join("\n"),
    }
}

/// Assemble tiers under the budget, dropping from the lowest priority up.
fn assemble_with_budget(mut tiers: Vec<ContextTier>, max_chars: usize) -> String {
    tiers.sort_by_key(|t| t.priority);

    let mut result = String::from("# SEMANTIC CONTEXT\n");

    for tier in &tiers {
        let candidate_len = result.len() + 1 + tier.content.len();
        if candidate_len <= max_chars {
            result.push('\n');
            result.push_str(&tier.content);
        } else {
            if tier.priority == 1 {
                // The model itself must always be present, even clipped.
                result.push('\n');
                result.push_str(&tier.content);
                let mut cut = max_chars.min(result.len());
                while cut > 0 && !result.is_char_boundary(cut) {
                    cut -= 1;
                }
                result.truncate(cut);
            }
            // Everything below this tier is lower priority - stop.
            break;
        }
    }

    result.trim().to_string()
}
