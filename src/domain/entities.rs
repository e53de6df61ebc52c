//! Domain entities: core data structures of a built forest

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::DomainError;

/// Stable identifier of a node within one build.
///
/// Leaves are named by their leaf index, internal nodes by their creation
/// order within the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum NodeId {
    Leaf(usize),
    Internal(usize),
}

impl NodeId {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeId::Leaf(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Leaf(index) => write!(f, "leaf-{index}"),
            NodeId::Internal(order) => write!(f, "node-{order}"),
        }
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl FromStr for NodeId {
    type Err = DomainError;

    /// Parse `leaf-<n>` or `node-<n>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::InvalidNodeId(s.to_string());
        if let Some(rest) = s.strip_prefix("leaf-") {
            rest.parse().map(NodeId::Leaf).map_err(|_| invalid())
        } else if let Some(rest) = s.strip_prefix("node-") {
            rest.parse().map(NodeId::Internal).map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }
}

/// Point on the canvas. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// One tree position in a built forest, leaf or internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestNode {
    pub id: NodeId,
    /// 0 = leaf level, increasing toward the root
    pub level: usize,
    pub position: Position,
    /// Cosmetic display label, not a cryptographic hash
    pub fingerprint: String,
    /// Left and right child, present only on internal nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<[NodeId; 2]>,
    /// Absent only for forest roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub is_root: bool,
    pub is_leaf: bool,
}

/// Parent to child connection with both endpoints resolved for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub from_position: Position,
    pub to_position: Position,
}
