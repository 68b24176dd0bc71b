//! The query-execution boundary.
//!
//! The compiler is synchronous and pure; actually running a generated
//! statement is the application's only suspending operation. The engine
//! defines the executor contract and a small runner that gives concurrent
//! runs last-request-wins semantics: a newer run invalidates any in-flight
//! older one, so a slow early query can never overwrite the results of a
//! faster later one.
//!
//! Execution errors are propagated verbatim - the engine never retries and
//! never rewrites a statement after a database-side rejection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

/// One result row: column name to value.
pub type DataRow = BTreeMap<String, CellValue>;

/// Errors surfaced from query execution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// The backend rejected or failed the statement. Carried verbatim.
    #[error("query execution failed: {0}")]
    Backend(String),
}

/// The collaborator that actually runs SQL against a backend.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<DataRow>, ExecutionError>;
}

/// Serializes result delivery for concurrent query runs.
///
/// Every [`run`](QueryRunner::run) claims a ticket; when a newer ticket is
/// claimed, any still-pending older run resolves to `None` instead of its
/// (now stale) result - without waiting for the backend to finish.
pub struct QueryRunner {
    executor: Arc<dyn QueryExecutor>,
    generation: watch::Sender<u64>,
}

impl QueryRunner {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            executor,
            generation,
        }
    }

    /// Execute `sql`, unless a newer run supersedes this one first.
    ///
    /// Returns `None` when superseded, `Some(result)` otherwise.
    pub async fn run(&self, sql: &str) -> Option<Result<Vec<DataRow>, ExecutionError>> {
        let ticket = {
            let mut ticket = 0;
            self.generation.send_modify(|g| {
                *g += 1;
                ticket = *g;
            });
            ticket
        };
        let mut changes = self.generation.subscribe();

        tokio::select! {
            result = self.executor.execute(sql) => {
                if *self.generation.borrow() == ticket {
                    Some(result)
                } else {
                    None
                }
            }
            _ = changes.wait_for(|g| *g != ticket) => None,
        }
    }

    /// Invalidate any in-flight run without starting a new one.
    pub fn cancel_pending(&self) {
        self.generation.send_modify(|g| *g += 1);
    }
}
