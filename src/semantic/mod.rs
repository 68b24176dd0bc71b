//! Semantic analysis over the data model: name-based inference, metric
//! availability, join-graph resolution, and AI context generation.

pub mod context;
pub mod inference;
pub mod join_graph;
pub mod metrics;

pub use context::{build_semantic_context, estimate_tokens, ContextInput, DEFAULT_MAX_CHARS};
pub use inference::{default_aggregation, infer_semantic_type};
pub use join_graph::{
    choose_driving_table, resolve_join_plan, JoinGraphError, JoinGraphResult, JoinPlan,
    ResolvedJoin,
};
pub use metrics::{
    available_metrics, metric_statuses, missing_field_suggestions, validate_metric_availability,
    MetricAvailability, MetricStatus,
};
