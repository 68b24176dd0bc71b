//! The model-consistency reducer.
//!
//! A pure `(state, action) -> state` function. Whenever the table/field
//! selection changes, derived state is reconciled: pivot entries, filters,
//! and field lists that reference fields no longer in the model are removed,
//! and joins whose endpoints left the model are pruned. Reconciliation is
//! idempotent and only ever shrinks derived state. Alias edits are cosmetic
//! and never trigger it.

use super::action::Action;
use super::EngineState;
use crate::model::{field_key, FieldRef, Filter, PivotZone, SemanticType};
use crate::semantic::inference::{default_aggregation, infer_semantic_type};

/// Apply one action.
pub fn reduce(mut state: EngineState, action: Action) -> EngineState {
    match action {
        Action::SetDiscoveredTables(tables) => {
            state.discovered_tables = tables;
            state
        }

        Action::SelectTable(table) => {
            let fields = state
                .discovered_tables
                .iter()
                .find(|t| t.name == table)
                .map(|t| t.fields.clone())
                .unwrap_or_default();
            state.model_configuration.insert_table(&table, fields);
            state.is_model_dirty = true;
            reconcile(state)
        }

        Action::DeselectTable(table) => {
            state.model_configuration.remove_table(&table);
            state.is_model_dirty = true;
            reconcile(state)
        }

        Action::SetTableFields { table, fields } => {
            state.model_configuration.insert_table(&table, fields);
            state.is_model_dirty = true;
            reconcile(state)
        }

        Action::SetModelConfiguration(model) => {
            state.model_configuration = model;
            state.is_model_dirty = true;
            reconcile(state)
        }

        Action::ConfirmModel => {
            state.confirmed_model_configuration = state.model_configuration.clone();
            state.is_model_dirty = false;
            state
        }

        Action::SetJoins(joins) => {
            state.joins = joins;
            state.is_model_dirty = true;
            reconcile(state)
        }

        Action::SetPivotConfig(pivot) => {
            state.pivot_config = pivot;
            state
        }

        Action::MovePivotField { field, zone } => {
            let aggregation = default_aggregation(semantic_type_of(&state, &field));
            state.pivot_config.assign_zone(&field, zone, aggregation);
            if !state.selected_fields.contains(&field) {
                state.selected_fields.push(field);
            }
            state
        }

        Action::RemovePivotField { zone, field } => {
            match zone {
                PivotZone::Rows => state.pivot_config.rows.retain(|f| f != &field),
                PivotZone::Columns => state.pivot_config.columns.retain(|f| f != &field),
                PivotZone::Values => state.pivot_config.values.retain(|v| v.field != field),
            }
            state
        }

        Action::RemovePivotValue { index } => {
            if index < state.pivot_config.values.len() {
                state.pivot_config.values.remove(index);
            }
            state
        }

        Action::RenamePivotValue { index, name } => {
            if let Some(value) = state.pivot_config.values.get_mut(index) {
                value.display_name = Some(name);
            }
            state
        }

        Action::SetFilters(filters) => {
            state.filters = filters;
            state
        }

        Action::AddFilter(filter) => {
            state.filters = upsert_filter(state.filters, filter);
            state
        }

        Action::UpdateFilter(filter) => {
            if let Some(existing) = state.filters.iter_mut().find(|f| f.id == filter.id) {
                *existing = filter;
            }
            state
        }

        Action::RemoveFilter(id) => {
            state.filters.retain(|f| f.id != id);
            state
        }

        Action::SetSelectedFields(fields) => {
            state.selected_fields = fields;
            state
        }

        Action::SetAnalysisActiveFields(fields) => {
            state.analysis_active_fields = fields;
            state
        }

        Action::SetFieldAlias { field_key, alias } => {
            state.field_aliases.insert(field_key, alias);
            state.is_model_dirty = true;
            state
        }

        Action::SetFieldMetadata {
            field_key,
            metadata,
        } => {
            state.field_metadata.insert(field_key, metadata);
            state
        }

        Action::SetSampleValues { field_key, values } => {
            state.sample_values.insert(field_key, values);
            state
        }

        Action::SetMetrics(metrics) => {
            state.metrics = metrics;
            state
        }

        Action::LoadBundle(bundle) => {
            if let Some(name) = bundle.config_name {
                state.config_name = name;
            }
            if let Some(model) = bundle.model_configuration {
                state.model_configuration = model;
            }
            if let Some(confirmed) = bundle.confirmed_model_configuration {
                state.confirmed_model_configuration = confirmed;
            }
            if let Some(joins) = bundle.joins {
                state.joins = joins;
            }
            if let Some(pivot) = bundle.pivot_config {
                state.pivot_config = pivot;
            }
            if let Some(filters) = bundle.filters {
                state.filters = filters;
            }
            if let Some(fields) = bundle.selected_fields {
                state.selected_fields = fields;
            }
            if let Some(fields) = bundle.analysis_active_fields {
                state.analysis_active_fields = fields;
            }
            if let Some(aliases) = bundle.field_aliases {
                state.field_aliases = aliases;
            }
            if let Some(metadata) = bundle.field_metadata {
                state.field_metadata = metadata;
            }
            if let Some(samples) = bundle.sample_values {
                state.sample_values = samples;
            }
            if let Some(metrics) = bundle.metrics {
                state.metrics = metrics;
            }
            // Loaded bundles always start clean, and are never trusted to be
            // internally consistent.
            state.is_model_dirty = false;
            reconcile(state)
        }

        Action::Reset => EngineState::default(),
    }
}

/// Remove derived state that no longer matches the draft model.
///
/// Idempotent: reconciling twice equals reconciling once. Monotonic:
/// removing a table only ever shrinks pivot/filter/field-list state.
pub fn reconcile(mut state: EngineState) -> EngineState {
    let allowed = state.model_configuration.field_set();

    let is_metric = |field: &str| state.metrics.iter().any(|m| m.id == field);

    state.pivot_config.rows.retain(|f| allowed.contains(f));
    state.pivot_config.columns.retain(|f| allowed.contains(f));
    // Values referencing a known metric id stay; the compiler gates them on
    // the metric's own availability.
    state
        .pivot_config
        .values
        .retain(|v| allowed.contains(&v.field) || is_metric(&v.field));

    state.filters.retain(|f| allowed.contains(&f.field));
    state.selected_fields.retain(|f| allowed.contains(f));
    state.analysis_active_fields.retain(|f| allowed.contains(f));

    let model = &state.model_configuration;
    state
        .joins
        .retain(|j| model.contains_table(&j.from) && model.contains_table(&j.to));

    state
}

/// Semantic type for a (possibly qualified) field: explicit metadata wins,
/// name inference otherwise.
fn semantic_type_of(state: &EngineState, field: &str) -> SemanticType {
    if let Some(owner) = state.active_model().table_for_field(field) {
        let bare = FieldRef::parse(field).field;
        let key = field_key(owner, &bare);
        if let Some(data_type) = state.field_metadata.get(&key).and_then(|m| m.data_type) {
            return data_type;
        }
    }
    infer_semantic_type(field)
}

/// Replace an existing filter on the same field (keeping its id), or append.
fn upsert_filter(mut filters: Vec<Filter>, incoming: Filter) -> Vec<Filter> {
    match filters.iter_mut().find(|f| f.field == incoming.field) {
        Some(existing) => {
            let id = existing.id.clone();
            *existing = incoming;
            existing.id = id;
        }
        None => filters.push(incoming),
    }
    filters
}
