//! Query compilation from the semantic model.
//!
//! Compiles {active model, joins, pivot configuration, filters, metrics,
//! field aliases} into a SQL string:
//!
//! ```text
//! Model + Pivot + Filters → clean → resolve tables → join plan → SQL
//! ```
//!
//! Two modes share the same core: *preview* selects every currently-selected
//! field unaggregated, *pivot* groups by rows+columns and aggregates values.
//! The compiler is a pure function of its inputs - identical inputs yield
//! byte-identical SQL - and performs no I/O; executing the result is the
//! caller's asynchronous boundary.
//!
//! An empty active model compiles to `None` (a legitimate "nothing to run"
//! state, not an error). A referenced table that cannot be joined in is a
//! fatal [`CompileError`]; pivot entries and filters naming fields outside
//! the model are dropped and reported as [`CompileWarning`]s.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::model::{
    field_key, prettify_field_name, DiscoveredTable, FieldAliases, FieldRef, Filter,
    FilterOperator, FilterValue, Join, JoinType, Metric, ModelConfiguration, PivotConfig,
    PivotValue,
};
use crate::semantic::join_graph::{resolve_join_plan, JoinGraphError, JoinPlan};
use crate::semantic::metrics::validate_metric_availability;
use crate::sql::{
    lit_float, lit_int, lit_str, raw, table_col, Dialect, Expr, ExprExt, JoinClause,
    JoinType as SqlJoinType, OrderByExpr, Query, TableRef,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort compilation. No SQL is emitted when these occur.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    JoinGraph(#[from] JoinGraphError),
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Where a dropped field was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropContext {
    Rows,
    Columns,
    Values,
    Filter,
}

/// A recoverable compilation problem: the offending entry was dropped and
/// the rest of the query proceeds. Callers surface these to the user -
/// dropping is never silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileWarning {
    pub field: String,
    pub context: DropContext,
    pub reason: String,
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dropped '{}' from {:?}: {}",
            self.field, self.context, self.reason
        )
    }
}

// ============================================================================
// Options
// ============================================================================

/// Default row cap for unaggregated preview queries.
pub const DEFAULT_PREVIEW_ROW_LIMIT: u64 = 100;

/// Default row cap for aggregated pivot queries.
pub const DEFAULT_PIVOT_ROW_LIMIT: u64 = 1_000;

/// How many distinct column values a case-pivot expands to.
pub const DISTINCT_PIVOT_VALUE_LIMIT: u64 = 25;

/// Compilation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileMode {
    /// Unaggregated SELECT over every selected field, capped small.
    Preview,
    /// Aggregated pivot: rows+columns group keys, values aggregated.
    #[default]
    Pivot,
}

/// Options controlling compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub mode: CompileMode,
    pub dialect: Dialect,
    /// Overrides the mode's default row cap when set.
    pub row_limit: Option<u64>,
}

impl CompileOptions {
    pub fn with_mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_row_limit(mut self, limit: u64) -> Self {
        self.row_limit = Some(limit);
        self
    }

    fn effective_row_limit(&self) -> u64 {
        self.row_limit.unwrap_or(match self.mode {
            CompileMode::Preview => DEFAULT_PREVIEW_ROW_LIMIT,
            CompileMode::Pivot => DEFAULT_PIVOT_ROW_LIMIT,
        })
    }
}

// ============================================================================
// Input
// ============================================================================

/// Everything the compiler reads. All state is borrowed; the compiler keeps
/// nothing between calls.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
    /// Draft model configuration (live edits).
    pub draft: &'a ModelConfiguration,
    /// Last confirmed model configuration.
    pub confirmed: &'a ModelConfiguration,
    pub joins: &'a [Join],
    pub pivot: &'a PivotConfig,
    pub filters: &'a [Filter],
    pub metrics: &'a [Metric],
    pub aliases: &'a FieldAliases,
    pub discovered_tables: &'a [DiscoveredTable],
}

impl<'a> CompileInput<'a> {
    /// The model driving SQL generation: the draft when it has content,
    /// otherwise the confirmed copy.
    pub fn active_model(&self) -> &'a ModelConfiguration {
        if !self.draft.is_empty() {
            self.draft
        } else {
            self.confirmed
        }
    }
}

/// A successfully generated query plus any recoverable drops that happened
/// on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub warnings: Vec<CompileWarning>,
}

// ============================================================================
// Cleaning
// ============================================================================

/// A pivot value resolved for emission.
enum ResolvedValue<'a> {
    Field(&'a PivotValue),
    Metric(&'a PivotValue, &'a Metric),
}

/// Pivot and filters with out-of-model references removed.
struct CleanInputs<'a> {
    rows: Vec<&'a str>,
    columns: Vec<&'a str>,
    values: Vec<ResolvedValue<'a>>,
    filters: Vec<&'a Filter>,
    warnings: Vec<CompileWarning>,
}

fn clean_inputs<'a>(
    input: &CompileInput<'a>,
    model: &ModelConfiguration,
) -> CleanInputs<'a> {
    let field_set = model.field_set();
    let mut warnings = Vec::new();

    let mut keep_group = |zone: DropContext, fields: &'a [String]| -> Vec<&'a str> {
        fields
            .iter()
            .filter_map(|f| {
                if field_set.contains(f) {
                    Some(f.as_str())
                } else {
                    warnings.push(CompileWarning {
                        field: f.clone(),
                        context: zone,
                        reason: "not in the current model".into(),
                    });
                    None
                }
            })
            .collect()
    };

    let rows = keep_group(DropContext::Rows, &input.pivot.rows);
    let columns = keep_group(DropContext::Columns, &input.pivot.columns);

    let mut values = Vec::new();
    for value in &input.pivot.values {
        // Metric ids take precedence over same-named physical fields.
        if let Some(metric) = input.metrics.iter().find(|m| m.id == value.field) {
            let availability = validate_metric_availability(metric, model);
            if availability.is_valid {
                values.push(ResolvedValue::Metric(value, metric));
            } else {
                warnings.push(CompileWarning {
                    field: value.field.clone(),
                    context: DropContext::Values,
                    reason: format!(
                        "metric '{}' is missing fields: {}",
                        metric.name,
                        availability.missing_fields.join(", ")
                    ),
                });
            }
        } else if field_set.contains(&value.field) {
            values.push(ResolvedValue::Field(value));
        } else {
            warnings.push(CompileWarning {
                field: value.field.clone(),
                context: DropContext::Values,
                reason: "not in the current model and not a known metric".into(),
            });
        }
    }

    let filters = input
        .filters
        .iter()
        .filter(|f| {
            if field_set.contains(&f.field) {
                true
            } else {
                warnings.push(CompileWarning {
                    field: f.field.clone(),
                    context: DropContext::Filter,
                    reason: "not in the current model".into(),
                });
                false
            }
        })
        .collect();

    CleanInputs {
        rows,
        columns,
        values,
        filters,
        warnings,
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile the input into SQL.
///
/// Returns `Ok(None)` when both model copies are empty - nothing to run.
/// Pivot mode with an entirely empty (or entirely dropped) pivot falls back
/// to the preview shape, matching how the tool behaves before any field is
/// placed in a zone.
pub fn compile(input: &CompileInput, options: &CompileOptions) -> CompileResult<Option<CompiledQuery>> {
    let model = input.active_model();
    if model.is_empty() {
        return Ok(None);
    }

    let clean = clean_inputs(input, model);
    let aggregated = options.mode == CompileMode::Pivot
        && !(clean.rows.is_empty() && clean.columns.is_empty() && clean.values.is_empty());

    let query = if aggregated {
        build_pivot_query(input, model, &clean, options)?
    } else {
        build_preview_query(input, model, &clean, options)?
    };

    Ok(Some(CompiledQuery {
        sql: query.to_sql(options.dialect),
        warnings: clean.warnings,
    }))
}

/// Preview shape: every selected field, qualified, unaggregated.
fn build_preview_query(
    input: &CompileInput,
    model: &ModelConfiguration,
    clean: &CleanInputs,
    options: &CompileOptions,
) -> CompileResult<Query> {
    // Every model table participates, weighted by its selected fields.
    let mut referenced: BTreeMap<String, usize> = BTreeMap::new();
    for table in model.tables() {
        let count = model.fields(table).map_or(0, |f| f.len());
        referenced.insert(table.to_string(), count);
    }

    let plan = resolve_join_plan(model, input.joins, &referenced)?;
    let mut query = from_and_joins(&plan);

    for table in model.tables() {
        for field in model.fields(table).unwrap_or_default() {
            let label = alias_label(input.aliases, table, field);
            query = query.select_as(table_col(table, field), &label);
        }
    }

    for filter in &clean.filters {
        query = query.filter(filter_expr(input, model, filter));
    }

    Ok(query.limit(options.effective_row_limit()))
}

/// Pivot shape: rows+columns as GROUP BY keys, values aggregated.
fn build_pivot_query(
    input: &CompileInput,
    model: &ModelConfiguration,
    clean: &CleanInputs,
    options: &CompileOptions,
) -> CompileResult<Query> {
    let referenced = referenced_tables(input, model, clean);
    let plan = resolve_join_plan(model, input.joins, &referenced)?;
    let mut query = from_and_joins(&plan);

    // Group keys first (rows then columns), then aggregated values.
    for field in clean.rows.iter().chain(clean.columns.iter()) {
        let (table, column) = owning_column(input, model, field);
        let label = alias_label(input.aliases, &table, &column);
        query = query
            .select_as(table_col(&table, &column), &label)
            .group_by(table_col(&table, &column));
    }

    for value in &clean.values {
        match value {
            ResolvedValue::Field(v) => {
                let (table, column) = owning_column(input, model, &v.field);
                let label = value_label(v, &column);
                query = query.select_as(v.aggregation.apply(table_col(&table, &column)), &label);
            }
            ResolvedValue::Metric(v, metric) => {
                // The formula is substituted verbatim; aggregation is baked
                // into the metric, so no further wrapping.
                let label = v.display_name.clone().unwrap_or_else(|| metric.name.clone());
                query = query.select_as(raw(&metric.formula), &label);
            }
        }
    }

    for filter in &clean.filters {
        query = query.filter(filter_expr(input, model, filter));
    }

    Ok(query.limit(options.effective_row_limit()))
}

/// Tables referenced by the cleaned pivot and filters, weighted by how many
/// referenced fields each owns. Available metric formulas pull the owners of
/// their required fields in too - a substituted formula must never name a
/// table missing from the FROM clause.
fn referenced_tables(
    input: &CompileInput,
    model: &ModelConfiguration,
    clean: &CleanInputs,
) -> BTreeMap<String, usize> {
    let discovered = input.discovered_tables;
    let mut referenced: BTreeMap<String, usize> = BTreeMap::new();
    let mut count = |table: Option<&str>| {
        if let Some(table) = table {
            *referenced.entry(table.to_string()).or_insert(0) += 1;
        }
    };

    for field in clean.rows.iter().chain(clean.columns.iter()) {
        count(resolve_owner(model, discovered, field));
    }
    for value in &clean.values {
        match value {
            ResolvedValue::Field(v) => count(resolve_owner(model, discovered, &v.field)),
            ResolvedValue::Metric(_, metric) => {
                for required in &metric.required_fields {
                    count(resolve_owner(model, discovered, required));
                }
            }
        }
    }
    for filter in &clean.filters {
        count(resolve_owner(model, discovered, &filter.field));
    }

    referenced
}

/// FROM plus the resolved join steps. The ON clause and outer-join side
/// always follow the declared orientation, whichever direction the graph
/// walk reached the table from.
fn from_and_joins(plan: &JoinPlan) -> Query {
    let mut query = Query::new().from(TableRef::new(&plan.driving_table));
    for step in &plan.steps {
        let join = &step.join;
        query = query.join(JoinClause {
            join_type: sql_join_type(join.join_type),
            table: TableRef::new(&step.joined_table),
            on: table_col(&join.from, &join.on.from).eq(table_col(&join.to, &join.on.to)),
        });
    }
    query
}

fn sql_join_type(join_type: JoinType) -> SqlJoinType {
    match join_type {
        JoinType::Left => SqlJoinType::Left,
        JoinType::Inner => SqlJoinType::Inner,
        JoinType::Right => SqlJoinType::Right,
    }
}

/// The table owning a (possibly qualified) field: the model first, schema
/// discovery second. A stale reference that resolves only through discovery
/// names a table outside the model, which the join resolver then rejects as
/// unreachable - never silently wrong SQL.
fn resolve_owner<'a>(
    model: &'a ModelConfiguration,
    discovered: &'a [DiscoveredTable],
    field: &str,
) -> Option<&'a str> {
    if let Some(table) = model.table_for_field(field) {
        return Some(table);
    }
    let fref = FieldRef::parse(field);
    discovered
        .iter()
        .find(|t| {
            fref.table.as_deref().is_none_or(|qualified| qualified == t.name)
                && t.fields.iter().any(|f| *f == fref.field)
        })
        .map(|t| t.name.as_str())
}

/// Resolve a field to its owning table and bare column for emission.
/// Cleaning guarantees membership, so the first-model-table fallback only
/// guards against inputs mutated between cleaning and emission.
fn owning_column(input: &CompileInput, model: &ModelConfiguration, field: &str) -> (String, String) {
    let fref = FieldRef::parse(field);
    let table = resolve_owner(model, input.discovered_tables, field)
        .or_else(|| model.tables().next())
        .unwrap_or_default();
    (table.to_string(), fref.field)
}

/// The AS label for a group-key or preview column: the configured alias for
/// `table.field` when present, the bare field name otherwise. Aliases touch
/// labels only, never the underlying reference.
fn alias_label(aliases: &FieldAliases, table: &str, field: &str) -> String {
    aliases
        .get(&field_key(table, field))
        .cloned()
        .unwrap_or_else(|| field.to_string())
}

/// The AS label for an aggregated value: the configured display name, or
/// `"<AGG> of <Prettified Field>"`.
fn value_label(value: &PivotValue, column: &str) -> String {
    value.display_name.clone().unwrap_or_else(|| {
        format!("{} of {}", value.aggregation, prettify_field_name(column))
    })
}

/// Compile one filter into a WHERE predicate.
fn filter_expr(input: &CompileInput, model: &ModelConfiguration, filter: &Filter) -> Expr {
    let (table, column) = owning_column(input, model, &filter.field);
    let column_expr = table_col(&table, &column);
    match filter.operator {
        FilterOperator::Equals => column_expr.eq(value_literal(&filter.value)),
        FilterOperator::Contains => column_expr.contains(&value_text(&filter.value)),
        FilterOperator::GreaterThan => column_expr.gt(value_literal(&filter.value)),
        FilterOperator::LessThan => column_expr.lt(value_literal(&filter.value)),
    }
}

/// Numbers bind unquoted (integers stay integers), text binds quoted.
fn value_literal(value: &FilterValue) -> Expr {
    match value {
        FilterValue::Number(n) => number_literal(*n),
        FilterValue::Text(s) => lit_str(s),
    }
}

fn number_literal(n: f64) -> Expr {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        lit_int(n as i64)
    } else {
        lit_float(n)
    }
}

fn value_text(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(s) => s.clone(),
        FilterValue::Number(n) => format_number(*n),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format(n).to_string()
    }
}

// ============================================================================
// Row-cap post-processing
// ============================================================================

static TRAILING_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)\s*(;?)\s*$").unwrap());

/// Clamp a generated statement to at most `cap` rows.
///
/// Rewrites an existing trailing `LIMIT n` when it exceeds the cap, appends
/// one when absent. This is the post-processing contract for restricted
/// (guest) callers; it is applied after generation and is not
/// user-controllable.
pub fn enforce_row_cap(sql: &str, cap: u64) -> String {
    if let Some(captures) = TRAILING_LIMIT.captures(sql) {
        let current: u64 = captures[1].parse().unwrap_or(u64::MAX);
        if current <= cap {
            return sql.to_string();
        }
        let start = captures.get(0).map_or(0, |m| m.start());
        let semicolon = &captures[2];
        format!("{}LIMIT {cap}{semicolon}", &sql[..start])
    } else {
        let trimmed = sql.trim_end();
        match trimmed.strip_suffix(';') {
            Some(body) => format!("{body}\nLIMIT {cap};"),
            None => format!("{trimmed}\nLIMIT {cap}"),
        }
    }
}

// ============================================================================
// Case-pivot expansion
// ============================================================================

/// The query that fetches the distinct values of the first pivot column,
/// for expanding columns into per-value aggregates. The DB round-trip
/// between this query and [`compile_case_pivot`] is the caller's boundary.
///
/// Returns `Ok(None)` when there is no model or no usable pivot column.
pub fn distinct_values_query(
    input: &CompileInput,
    options: &CompileOptions,
) -> CompileResult<Option<CompiledQuery>> {
    let model = input.active_model();
    if model.is_empty() {
        return Ok(None);
    }

    let clean = clean_inputs(input, model);
    let Some(&pivot_column) = clean.columns.first() else {
        return Ok(None);
    };

    let (table, column) = owning_column(input, model, pivot_column);
    let mut referenced: BTreeMap<String, usize> = BTreeMap::new();
    referenced.insert(table.clone(), 1);
    for filter in &clean.filters {
        if let Some(owner) = model.table_for_field(&filter.field) {
            *referenced.entry(owner.to_string()).or_insert(0) += 1;
        }
    }

    let plan = resolve_join_plan(model, input.joins, &referenced)?;
    let mut query = from_and_joins(&plan)
        .select(vec![table_col(&table, &column)])
        .distinct();

    for filter in &clean.filters {
        query = query.filter(filter_expr(input, model, filter));
    }
    query = query
        .filter(table_col(&table, &column).is_not_null())
        .order_by(OrderByExpr::Position(1))
        .limit(DISTINCT_PIVOT_VALUE_LIMIT);

    Ok(Some(CompiledQuery {
        sql: query.to_sql(options.dialect),
        warnings: clean.warnings,
    }))
}

/// Expand the first pivot column into one aggregate per distinct value:
/// `AGG(CASE WHEN col = value THEN field END) AS "value - label"`.
///
/// `pivot_values` are the distinct values previously fetched with
/// [`distinct_values_query`]. Returns `Ok(None)` when the pivot has no
/// columns or no values to expand.
pub fn compile_case_pivot(
    input: &CompileInput,
    options: &CompileOptions,
    pivot_values: &[FilterValue],
) -> CompileResult<Option<CompiledQuery>> {
    let model = input.active_model();
    if model.is_empty() {
        return Ok(None);
    }

    let clean = clean_inputs(input, model);
    let Some(&pivot_column) = clean.columns.first() else {
        return Ok(None);
    };
    if clean.values.is_empty() {
        return Ok(None);
    }

    let (pivot_table, pivot_col) = owning_column(input, model, pivot_column);
    let referenced = referenced_tables(input, model, &clean);
    let plan = resolve_join_plan(model, input.joins, &referenced)?;
    let mut query = from_and_joins(&plan);

    for field in &clean.rows {
        let (table, column) = owning_column(input, model, field);
        let label = alias_label(input.aliases, &table, &column);
        query = query
            .select_as(table_col(&table, &column), &label)
            .group_by(table_col(&table, &column));
    }

    for pivot_value in pivot_values {
        for value in &clean.values {
            let ResolvedValue::Field(v) = value else {
                continue;
            };
            let (table, column) = owning_column(input, model, &v.field);
            let case = Expr::CaseWhen {
                cond: Box::new(
                    table_col(&pivot_table, &pivot_col).eq(value_literal(pivot_value)),
                ),
                result: Box::new(table_col(&table, &column)),
            };
            let label = format!("{} - {}", value_text(pivot_value), value_label(v, &column));
            query = query.select_as(v.aggregation.apply(case), &label);
        }
    }

    // Metric formulas are opaque: they cannot be split per column value, so
    // each is emitted once, unsplit.
    for value in &clean.values {
        if let ResolvedValue::Metric(v, metric) = value {
            let label = v.display_name.clone().unwrap_or_else(|| metric.name.clone());
            query = query.select_as(raw(&metric.formula), &label);
        }
    }

    for filter in &clean.filters {
        query = query.filter(filter_expr(input, model, filter));
    }

    Ok(Some(CompiledQuery {
        sql: query.limit(options.effective_row_limit()).to_sql(options.dialect),
        warnings: clean.warnings,
    }))
}
