//! Engine state and its pure reducer.
//!
//! The state is an explicit struct threaded through `reduce`; there is no
//! ambient store. A single owner is responsible for serializing dispatches
//! so actions apply one at a time, in order. Draft and confirmed model
//! copies coexist: the draft feeds live SQL preview, the confirmed copy
//! feeds the "available fields" the pivot/filter UI offers, so the UI does
//! not thrash while an edit is mid-flight.

pub mod action;
pub mod proposal;
pub mod reducer;

pub use action::Action;
pub use proposal::{
    apply_analysis_proposal, apply_model_proposal, AnalysisProposal, DroppedItem, ModelProposal,
    ProposalError, ProposalReport,
};
pub use reducer::{reconcile, reduce};

use std::collections::BTreeMap;

use crate::compile::CompileInput;
use crate::model::{
    field_key, DiscoveredTable, FieldAliases, FieldMetadata, Filter, Join, Metric,
    ModelConfiguration, PivotConfig, SchemaRegistry,
};
use crate::semantic::inference::infer_semantic_type;

/// The engine's full state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    pub config_name: String,
    pub discovered_tables: Vec<DiscoveredTable>,

    /// Draft model configuration, edited freely.
    pub model_configuration: ModelConfiguration,
    /// Last explicitly confirmed configuration.
    pub confirmed_model_configuration: ModelConfiguration,
    /// True while the draft has unconfirmed changes.
    pub is_model_dirty: bool,

    pub joins: Vec<Join>,
    pub pivot_config: PivotConfig,
    pub filters: Vec<Filter>,
    pub selected_fields: Vec<String>,
    pub analysis_active_fields: Vec<String>,
    pub field_aliases: FieldAliases,
    pub field_metadata: BTreeMap<String, FieldMetadata>,
    pub sample_values: BTreeMap<String, Vec<String>>,
    pub metrics: Vec<Metric>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The model driving SQL generation: draft if non-empty, else confirmed.
    pub fn active_model(&self) -> &ModelConfiguration {
        if !self.model_configuration.is_empty() {
            &self.model_configuration
        } else {
            &self.confirmed_model_configuration
        }
    }

    /// Qualified field keys offered to the pivot/filter UI. Always derived
    /// from the confirmed model, never the draft.
    pub fn available_fields(&self) -> Vec<String> {
        let model = &self.confirmed_model_configuration;
        model
            .tables()
            .flat_map(|table| {
                model
                    .fields(table)
                    .unwrap_or_default()
                    .iter()
                    .map(move |field| field_key(table, field))
            })
            .collect()
    }

    /// Borrow everything the query compiler reads.
    pub fn compile_input(&self) -> CompileInput<'_> {
        CompileInput {
            draft: &self.model_configuration,
            confirmed: &self.confirmed_model_configuration,
            joins: &self.joins,
            pivot: &self.pivot_config,
            filters: &self.filters,
            metrics: &self.metrics,
            aliases: &self.field_aliases,
            discovered_tables: &self.discovered_tables,
        }
    }
}

/// Seed metadata for every field of `model` that has none yet, preferring
/// registry descriptions/types and falling back to name inference. Existing
/// entries are never overwritten, so manual edits and AI updates stay
/// consistent.
pub fn seed_field_metadata(
    model: &ModelConfiguration,
    existing: &BTreeMap<String, FieldMetadata>,
    registry: Option<&SchemaRegistry>,
) -> BTreeMap<String, FieldMetadata> {
    let mut metadata = existing.clone();

    for table in model.tables() {
        let registry_table = registry.and_then(|r| r.table(table));
        for field in model.fields(table).unwrap_or_default() {
            let key = field_key(table, field);
            if metadata.contains_key(&key) {
                continue;
            }
            let registry_column = registry_table.and_then(|t| t.column(field));
            metadata.insert(
                key,
                FieldMetadata {
                    description: registry_column.and_then(|c| c.description.clone()),
                    data_type: registry_column
                        .and_then(|c| c.semantic_type)
                        .or_else(|| Some(infer_semantic_type(field))),
                },
            );
        }
    }

    metadata
}
