//! Applying AI-proposed changes.
//!
//! Proposals flow through the same reducer paths as manual edits - the AI
//! has no privileged bypass of validation. Entries referencing fields
//! outside the active model are filtered out, each with a recorded reason,
//! and the caller is told exactly what was dropped. A proposal whose every
//! entry is dropped fails outright rather than applying as a no-op.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::Action;
use super::reducer::reduce;
use super::EngineState;
use crate::model::{Filter, Join, ModelConfiguration, PivotConfig};

/// A proposed pivot/filter change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProposal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_config: Option<PivotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
}

/// A proposed model expansion or replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProposal {
    pub model_configuration: ModelConfiguration,
    #[serde(default)]
    pub joins: Vec<Join>,
}

/// Why proposal application failed entirely.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("nothing in the proposal applies to the current model")]
    NothingApplicable,
}

/// One proposed entry that was filtered out, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedItem {
    pub name: String,
    pub reason: String,
}

/// What happened while applying a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalReport {
    pub applied: usize,
    pub dropped: Vec<DroppedItem>,
}

/// Apply a pivot/filter proposal against the active model.
///
/// Invalid entries are dropped with reasons; valid ones dispatch through the
/// reducer. Errs with [`ProposalError::NothingApplicable`] when the proposal
/// contained entries but none survived.
pub fn apply_analysis_proposal(
    mut state: EngineState,
    proposal: AnalysisProposal,
) -> Result<(EngineState, ProposalReport), ProposalError> {
    let allowed = state.active_model().field_set();
    let is_metric = |field: &str| state.metrics.iter().any(|m| m.id == field);

    let mut report = ProposalReport::default();
    let mut proposed = 0usize;

    if let Some(pivot) = proposal.pivot_config {
        let mut clean = PivotConfig::default();

        for field in pivot.rows {
            proposed += 1;
            if allowed.contains(&field) {
                clean.rows.push(field);
            } else {
                report.dropped.push(DroppedItem {
                    reason: format!("field '{field}' is not in the current model"),
                    name: field,
                });
            }
        }
        for field in pivot.columns {
            proposed += 1;
            if allowed.contains(&field) {
                clean.columns.push(field);
            } else {
                report.dropped.push(DroppedItem {
                    reason: format!("field '{field}' is not in the current model"),
                    name: field,
                });
            }
        }
        for value in pivot.values {
            proposed += 1;
            if allowed.contains(&value.field) || is_metric(&value.field) {
                clean.values.push(value);
            } else {
                report.dropped.push(DroppedItem {
                    reason: format!(
                        "field '{}' is not in the current model and is not a metric",
                        value.field
                    ),
                    name: value.field,
                });
            }
        }

        report.applied += clean.rows.len() + clean.columns.len() + clean.values.len();
        state = reduce(state, Action::SetPivotConfig(clean));
    }

    if let Some(filters) = proposal.filters {
        let mut clean = Vec::new();
        for filter in filters {
            proposed += 1;
            if allowed.contains(&filter.field) {
                clean.push(filter);
            } else {
                report.dropped.push(DroppedItem {
                    reason: format!("filter field '{}' is not in the current model", filter.field),
                    name: filter.field,
                });
            }
        }
        report.applied += clean.len();
        state = reduce(state, Action::SetFilters(clean));
    }

    if proposed > 0 && report.applied == 0 {
        return Err(ProposalError::NothingApplicable);
    }

    Ok((state, report))
}

/// Apply a model proposal: replace the draft configuration and joins via the
/// reducer, which prunes joins whose endpoints the proposal does not cover.
pub fn apply_model_proposal(
    mut state: EngineState,
    proposal: ModelProposal,
) -> (EngineState, ProposalReport) {
    let mut report = ProposalReport::default();

    for join in &proposal.joins {
        let covered = proposal.model_configuration.contains_table(&join.from)
            && proposal.model_configuration.contains_table(&join.to);
        if covered {
            report.applied += 1;
        } else {
            report.dropped.push(DroppedItem {
                name: format!("{} -> {}", join.from, join.to),
                reason: "join endpoint is not in the proposed model".into(),
            });
        }
    }
    report.applied += proposal.model_configuration.tables().count();

    state = reduce(
        state,
        Action::SetModelConfiguration(proposal.model_configuration),
    );
    state = reduce(state, Action::SetJoins(proposal.joins));

    (state, report)
}
