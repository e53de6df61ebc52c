//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent violated forest invariants and malformed input.
/// A build that violates an invariant is a defect, not a runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid node id: {0} (expected leaf-<n> or node-<n>)")]
    InvalidNodeId(String),

    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("forest with {leaf_count} leaves has {actual} roots, expected {expected}")]
    RootCountMismatch {
        leaf_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("forest has {actual} leaves, expected {expected}")]
    LeafCountMismatch { expected: usize, actual: usize },

    #[error("non-root node without parent: {0}")]
    OrphanNode(NodeId),

    #[error("malformed internal node {node}: {reason}")]
    MalformedInternalNode { node: NodeId, reason: String },

    #[error("forest has {actual} edges, expected {expected}")]
    EdgeCountMismatch { expected: usize, actual: usize },
}
