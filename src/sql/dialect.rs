//! SQL dialect definitions and formatting rules.
//!
//! The engine targets the three backends the product can connect to:
//!
//! - [`Postgres`] - hosted Postgres (also the ANSI-ish default)
//! - [`Sqlite`] - SQLite-in-browser
//! - [`Athena`] - Presto-style lakehouse engine
//!
//! Dialects differ in how a case-insensitive `contains` filter is rendered:
//! Postgres has `ILIKE`, SQLite's `LIKE` is already case-insensitive for
//! ASCII, and Athena needs both sides folded with `LOWER()`.

use serde::{Deserialize, Serialize};

/// How a dialect renders a case-insensitive LIKE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainsStrategy {
    /// `expr ILIKE pattern`
    ILike,
    /// `expr LIKE pattern` (engine folds case on its own)
    Like,
    /// `LOWER(expr) LIKE LOWER(pattern)`
    LowerLike,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display.
    fn name(&self) -> &'static str;

    /// Quote an identifier.
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Strategy for the `contains` filter operator.
    fn contains_strategy(&self) -> ContainsStrategy {
        ContainsStrategy::ILike
    }
}

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn contains_strategy(&self) -> ContainsStrategy {
        // LIKE is case-insensitive for ASCII in SQLite.
        ContainsStrategy::Like
    }
}

/// Athena (Presto) dialect.
#[derive(Debug, Clone, Copy)]
pub struct Athena;

impl SqlDialect for Athena {
    fn name(&self) -> &'static str {
        "athena"
    }

    fn contains_strategy(&self) -> ContainsStrategy {
        ContainsStrategy::LowerLike
    }
}

/// Supported dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
    Athena,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::Sqlite => &Sqlite,
            Dialect::Athena => &Athena,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn contains_strategy(&self) -> ContainsStrategy {
        self.dialect().contains_strategy()
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            "athena" | "presto" => Ok(Dialect::Athena),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}

/// Shared helper functions for dialect implementations.
pub mod helpers {
    /// Quote identifier with double quotes (ANSI style).
    pub fn quote_double(ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Quote string with single quotes (standard SQL).
    pub fn quote_string_single(s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }
}
