//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates dialect-aware
//! SELECT statements. It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{ContainsStrategy, Dialect, SqlDialect};
pub use expr::{
    col, func, lit_float, lit_int, lit_null, lit_str, raw, star, table_col, BinaryOperator, Expr,
    ExprExt, Literal,
};
pub use query::{JoinClause, JoinType, OrderByExpr, Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};
