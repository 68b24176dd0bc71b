//! Join graph resolution.
//!
//! Treats model tables as nodes and declared joins as undirected edges,
//! then finds the joins needed to connect every table a query references
//! into a single FROM clause. Directionality and join type are remembered
//! for emission.
//!
//! Traversal is breadth-first from a deterministically chosen driving table.
//! A table reachable by multiple paths uses the first one discovered, with
//! joins considered in declaration order - paths are not compared for cost,
//! and the first-declared-join-wins rule is a known simplification.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use thiserror::Error;

use crate::model::{Join, ModelConfiguration};

/// Errors that can occur during join resolution.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinGraphError {
    /// A referenced table cannot be connected to the driving table.
    ///
    /// Fatal by design: emitting a query that silently omits an unjoined
    /// table's data (or cross-joins it) is worse than failing.
    #[error("table '{table}' is not reachable from '{driving_table}' via any declared join")]
    UnreachableTable {
        table: String,
        driving_table: String,
    },
}

/// Result type for join resolution.
pub type JoinGraphResult<T> = Result<T, JoinGraphError>;

/// One emitted join step: the declared join plus which side it newly reaches.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoin {
    pub join: Join,
    /// The table this step adds to the FROM clause.
    pub joined_table: String,
}

/// The joins needed to satisfy a query, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub driving_table: String,
    pub steps: Vec<ResolvedJoin>,
}

/// Pick the driving table: the one owning the most referenced fields,
/// ties broken lexicographically. `referenced` maps table name to its
/// referenced-field count.
pub fn choose_driving_table(referenced: &BTreeMap<String, usize>) -> Option<&str> {
    referenced
        .iter()
        .max_by(|(table_a, count_a), (table_b, count_b)| {
            // BTreeMap iterates ascending, so on equal counts prefer the
            // lexicographically smaller name by making it compare greater.
            count_a.cmp(count_b).then(table_b.cmp(table_a))
        })
        .map(|(table, _)| table.as_str())
}

/// Resolve the minimal join plan connecting every referenced table.
///
/// Joins whose endpoints are not both in the model are ignored (the reducer
/// prunes them, but externally supplied join lists are not trusted).
/// A single-table query yields an empty plan. Zero referenced tables must be
/// rejected upstream; this function treats it as an empty-model bug guard
/// and returns an empty plan for the lexicographically first model table.
pub fn resolve_join_plan(
    model: &ModelConfiguration,
    joins: &[Join],
    referenced: &BTreeMap<String, usize>,
) -> JoinGraphResult<JoinPlan> {
    let driving_table = match choose_driving_table(referenced) {
        Some(t) => t.to_string(),
        None => {
            return Ok(JoinPlan {
                driving_table: model.tables().next().unwrap_or_default().to_string(),
                steps: Vec::new(),
            })
        }
    };

    // Graph over model tables; edge weights index into `joins`.
    let mut graph: UnGraph<String, usize> = UnGraph::new_undirected();
    let mut node_of: HashMap<&str, NodeIndex> = HashMap::new();
    for table in model.tables() {
        node_of.insert(table, graph.add_node(table.to_string()));
    }
    for (idx, join) in joins.iter().enumerate() {
        if let (Some(&a), Some(&b)) = (
            node_of.get(join.from.as_str()),
            node_of.get(join.to.as_str()),
        ) {
            graph.add_edge(a, b, idx);
        }
    }

    let Some(&root) = node_of.get(driving_table.as_str()) else {
        // Driving table not in the model at all - nothing is reachable.
        if let Some(missing) = referenced.keys().next() {
            return Err(JoinGraphError::UnreachableTable {
                table: missing.clone(),
                driving_table,
            });
        }
        return Ok(JoinPlan { driving_table, steps: Vec::new() });
    };

    // BFS, taking each node's incident edges in declaration order.
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut discovery: Vec<(NodeIndex, usize)> = Vec::new();
    let mut seen: HashSet<NodeIndex> = HashSet::from([root]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        // petgraph iterates incident edges newest-first; sort by edge id so
        // the first declared join wins.
        let mut incident: Vec<_> = graph.edges(current).collect();
        incident.sort_by_key(|e| e.id());

        for edge in incident {
            let next = if edge.source() == current {
                edge.target()
            } else {
                edge.source()
            };
            if seen.insert(next) {
                parent.insert(next, current);
                discovery.push((next, *edge.weight()));
                queue.push_back(next);
            }
        }
    }

    // Every referenced table must have been reached.
    for table in referenced.keys() {
        match node_of.get(table.as_str()) {
            Some(idx) if seen.contains(idx) => {}
            _ => {
                return Err(JoinGraphError::UnreachableTable {
                    table: table.clone(),
                    driving_table,
                })
            }
        }
    }

    // Keep only the steps on paths from the root to referenced tables.
    let mut needed: HashSet<NodeIndex> = HashSet::new();
    for table in referenced.keys() {
        let mut cursor = node_of[table.as_str()];
        while cursor != root && needed.insert(cursor) {
            cursor = parent[&cursor];
        }
    }

    let steps = discovery
        .into_iter()
        .filter(|(node, _)| needed.contains(node))
        .map(|(node, join_idx)| ResolvedJoin {
            join: joins[join_idx].clone(),
            joined_table: graph[node].clone(),
        })
        .collect();

    Ok(JoinPlan {
        driving_table,
        steps,
    })
}
