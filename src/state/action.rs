//! State transitions.

use crate::model::{
    ConfigBundle, DiscoveredTable, FieldMetadata, Filter, Join, Metric, ModelConfiguration,
    PivotConfig, PivotZone,
};

/// Every way the engine state can change. Applied one at a time, in
/// dispatch order, by [`reduce`](super::reduce).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Schema discovery
    SetDiscoveredTables(Vec<DiscoveredTable>),

    // Model editing (draft)
    /// Select a table with every discovered field.
    SelectTable(String),
    DeselectTable(String),
    SetTableFields { table: String, fields: Vec<String> },
    /// Replace the whole draft configuration (load or AI proposal).
    SetModelConfiguration(ModelConfiguration),
    /// Copy draft to confirmed and clear the dirty flag.
    ConfirmModel,
    SetJoins(Vec<Join>),

    // Pivot
    SetPivotConfig(PivotConfig),
    /// Move a field into a zone, clearing it from any prior zone.
    MovePivotField { field: String, zone: PivotZone },
    RemovePivotField { zone: PivotZone, field: String },
    RemovePivotValue { index: usize },
    RenamePivotValue { index: usize, name: String },

    // Filters
    SetFilters(Vec<Filter>),
    /// Add a filter; a filter already targeting the same field is replaced
    /// in place, keeping its id.
    AddFilter(Filter),
    UpdateFilter(Filter),
    RemoveFilter(String),

    // Field lists
    SetSelectedFields(Vec<String>),
    SetAnalysisActiveFields(Vec<String>),

    // Cosmetic + metadata
    SetFieldAlias { field_key: String, alias: String },
    SetFieldMetadata { field_key: String, metadata: FieldMetadata },
    SetSampleValues { field_key: String, values: Vec<String> },

    // Metrics
    SetMetrics(Vec<Metric>),

    // Lifecycle
    /// Apply an externally persisted bundle. Loaded configs are not trusted
    /// to be consistent; cleanup re-runs afterwards.
    LoadBundle(ConfigBundle),
    Reset,
}
