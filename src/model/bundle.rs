//! The persisted configuration bundle.
//!
//! Externally loaded bundles are not trusted to be internally consistent:
//! the reducer re-runs its consistency cleanup after every load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field::{FieldAliases, FieldMetadata};
use super::filter::Filter;
use super::join::Join;
use super::metric::Metric;
use super::pivot::PivotConfig;
use super::table::ModelConfiguration;

/// Serialized application configuration, as saved/loaded by the persistence
/// collaborator. Every section is optional; absent sections leave the
/// current state untouched on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_configuration: Option<ModelConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_model_configuration: Option<ModelConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins: Option<Vec<Join>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_config: Option<PivotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_active_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_aliases: Option<FieldAliases>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_metadata: Option<BTreeMap<String, FieldMetadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_values: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<Metric>>,
}
