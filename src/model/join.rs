//! Declared joins between model tables.

use serde::{Deserialize, Serialize};

/// Join flavor. Serialized with the SQL keyword spelling the persistence
/// bundle uses (`"LEFT JOIN"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    #[serde(rename = "LEFT JOIN")]
    Left,
    #[serde(rename = "INNER JOIN")]
    Inner,
    #[serde(rename = "RIGHT JOIN")]
    Right,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JoinType::Left => "LEFT JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Right => "RIGHT JOIN",
        };
        write!(f, "{s}")
    }
}

/// The ON condition columns of a declared join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOn {
    pub from: String,
    pub to: String,
}

/// A declared join between two model tables.
///
/// Undirected for connectivity purposes (a join from A to B also satisfies a
/// query reaching A from B) but directional for SQL emission: the outer-join
/// side and the ON clause always follow the declared orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub join_type: JoinType,
    pub on: JoinOn,
}

impl Join {
    /// Does this join touch the given table on either side?
    pub fn touches(&self, table: &str) -> bool {
        self.from == table || self.to == table
    }

    /// The table on the opposite side, if this join touches `table`.
    pub fn other_side(&self, table: &str) -> Option<&str> {
        if self.from == table {
            Some(&self.to)
        } else if self.to == table {
            Some(&self.from)
        } else {
            None
        }
    }
}
