//! # Trellis
//!
//! A semantic data-modeling engine that compiles pivot-style analyses to SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Edits (UI actions / AI proposals)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [state::reduce]
//! ┌─────────────────────────────────────────────────────────┐
//! │   EngineState (model, joins, pivot, filters, metrics)    │
//! │         + consistency reconciliation on model change     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SQL string (preview or aggregated pivot)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [exec::QueryRunner]
//! ┌─────────────────────────────────────────────────────────┐
//! │       External database backend (async boundary)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The compiler is a pure function of the state: it holds nothing between
//! calls, may be re-invoked redundantly, and identical inputs always produce
//! byte-identical SQL. The generated statement is derived state - it is
//! never stored, only recomputed.

pub mod compile;
pub mod config;
pub mod exec;
pub mod model;
pub mod semantic;
pub mod sql;
pub mod state;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, enforce_row_cap, CompileError, CompileInput, CompileMode, CompileOptions,
        CompileResult, CompileWarning, CompiledQuery,
    };
    pub use crate::config::Settings;
    pub use crate::exec::{CellValue, DataRow, ExecutionError, QueryExecutor, QueryRunner};
    pub use crate::model::{
        Aggregation, ConfigBundle, DiscoveredTable, Filter, FilterOperator, FilterValue, Join,
        JoinType, Metric, ModelConfiguration, PivotConfig, PivotValue, PivotZone, SchemaRegistry,
        SemanticType,
    };
    pub use crate::semantic::{
        build_semantic_context, infer_semantic_type, resolve_join_plan, validate_metric_availability,
        ContextInput, JoinGraphError,
    };
    pub use crate::sql::{Dialect, SqlDialect};
    pub use crate::state::{reduce, Action, EngineState};
}
