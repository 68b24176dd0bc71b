//! Expression AST - the core of SQL expression building.
//!
//! A strongly-typed AST for the expressions the query generator emits,
//! with exhaustive pattern matching enforced by the compiler.

use super::dialect::{ContainsStrategy, Dialect, SqlDialect};
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens_for_dialect()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Binary comparison: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// Case-insensitive containment: expr LIKE '%needle%'
    /// (rendered per the dialect's [`ContainsStrategy`])
    Contains { expr: Box<Expr>, needle: String },

    /// Searched CASE with a single WHEN arm: CASE WHEN cond THEN result END
    CaseWhen { cond: Box<Expr>, result: Box<Expr> },

    /// IS NOT NULL
    IsNotNull(Box<Expr>),

    /// Wildcard: *
    Star,

    /// Raw SQL fragment passed through without escaping.
    ///
    /// Never feed user input here - only metric formulas that were
    /// validated at creation time.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Null,
}

/// Binary operators used by filter compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Gt,
    Lt,
}

impl Expr {
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            Expr::Column { table, column } => {
                ts.push(Token::QualifiedIdent {
                    table: table.clone(),
                    name: column.clone(),
                });
            }
            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Null => Token::LitNull,
                });
            }
            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens_for_dialect(dialect));
                ts.space();
                ts.push(match op {
                    BinaryOperator::Eq => Token::Eq,
                    BinaryOperator::Gt => Token::Gt,
                    BinaryOperator::Lt => Token::Lt,
                });
                ts.space();
                ts.append(&right.to_tokens_for_dialect(dialect));
            }
            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }
            Expr::Contains { expr, needle } => {
                // The needle is quote-escaped by LitString. LIKE wildcards
                // inside it are left alone: SQLite has no default ESCAPE
                // character, so there is no portable way to neutralize them.
                let pattern = Token::LitString(format!("%{needle}%"));
                match dialect.contains_strategy() {
                    ContainsStrategy::ILike => {
                        ts.append(&expr.to_tokens_for_dialect(dialect));
                        ts.space().push(Token::ILike).space().push(pattern);
                    }
                    ContainsStrategy::Like => {
                        ts.append(&expr.to_tokens_for_dialect(dialect));
                        ts.space().push(Token::Like).space().push(pattern);
                    }
                    ContainsStrategy::LowerLike => {
                        ts.push(Token::FunctionName("lower".into())).lparen();
                        ts.append(&expr.to_tokens_for_dialect(dialect));
                        ts.rparen();
                        ts.space().push(Token::Like).space();
                        ts.push(Token::FunctionName("lower".into())).lparen();
                        ts.push(pattern);
                        ts.rparen();
                    }
                }
            }
            Expr::CaseWhen { cond, result } => {
                ts.push(Token::Case).space().push(Token::When).space();
                ts.append(&cond.to_tokens_for_dialect(dialect));
                ts.space().push(Token::Then).space();
                ts.append(&result.to_tokens_for_dialect(dialect));
                ts.space().push(Token::End);
            }
            Expr::IsNotNull(expr) => {
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.space().push(Token::IsNotNull);
            }
            Expr::Star => {
                ts.push(Token::Star);
            }
            Expr::Raw(s) => {
                ts.push(Token::Raw(s.clone()));
            }
        }
        ts
    }

    /// Generate SQL for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Unqualified column reference.
pub fn col(column: &str) -> Expr {
    Expr::Column {
        table: None,
        column: column.into(),
    }
}

/// Table-qualified column reference.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Function call expression.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

/// Raw trusted SQL fragment.
pub fn raw(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

pub fn star() -> Expr {
    Expr::Star
}

/// Comparison helpers.
pub trait ExprExt: Sized {
    fn eq(self, other: Expr) -> Expr;
    fn gt(self, other: Expr) -> Expr;
    fn lt(self, other: Expr) -> Expr;
    fn contains(self, needle: &str) -> Expr;
    fn is_not_null(self) -> Expr;
}

impl ExprExt for Expr {
    fn eq(self, other: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self),
            op: BinaryOperator::Eq,
            right: Box::new(other),
        }
    }

    fn gt(self, other: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self),
            op: BinaryOperator::Gt,
            right: Box::new(other),
        }
    }

    fn lt(self, other: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self),
            op: BinaryOperator::Lt,
            right: Box::new(other),
        }
    }

    fn contains(self, needle: &str) -> Expr {
        Expr::Contains {
            expr: Box::new(self),
            needle: needle.into(),
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNotNull(Box::new(self))
    }
}
