//! Immutable forest model produced by one build.

use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;

use crate::domain::entities::{Edge, ForestNode, NodeId};
use crate::domain::error::DomainError;

/// Nodes and edges of one build.
///
/// Never mutated after construction; a new leaf count yields a new forest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Forest {
    /// Leaves first, then internal nodes in creation order
    nodes: Vec<ForestNode>,
    /// Left edge then right edge for each internal node, in creation order
    edges: Vec<Edge>,
    /// Root ids, largest tree first
    roots: Vec<NodeId>,
    /// Salt the leaf fingerprints were derived from
    salt: u64,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
}

/// Structural view of one node, without layout or fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub id: NodeId,
    pub level: usize,
    pub parent: Option<NodeId>,
    pub children: Option<[NodeId; 2]>,
    pub is_root: bool,
}

impl Forest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    pub(crate) fn from_parts(
        nodes: Vec<ForestNode>,
        edges: Vec<Edge>,
        roots: Vec<NodeId>,
        index: HashMap<NodeId, usize>,
        salt: u64,
    ) -> Self {
        Self {
            nodes,
            edges,
            roots,
            salt,
            index,
        }
    }

    pub fn nodes(&self) -> &[ForestNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&ForestNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Roots, largest tree first.
    pub fn roots(&self) -> impl Iterator<Item = &ForestNode> {
        self.roots.iter().filter_map(|id| self.node(id))
    }

    pub fn leaves(&self) -> impl Iterator<Item = &ForestNode> {
        self.nodes.iter().filter(|n| n.is_leaf)
    }

    pub fn root_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_root).count()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Number of occupied rows: max level + 1, or 0 for an empty forest.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.level + 1).max().unwrap_or(0)
    }

    /// Shape of every node in creation order, ignoring salt-dependent data.
    pub fn shape(&self) -> Vec<NodeShape> {
        self.nodes
            .iter()
            .map(|n| NodeShape {
                id: n.id,
                level: n.level,
                parent: n.parent,
                children: n.children,
                is_root: n.is_root,
            })
            .collect()
    }

    /// Pre-order walk of the tree below `root`, left child first.
    pub fn iter_tree(&self, root: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, root)
    }

    /// Checks the structural invariants of a forest built from its leaves.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Result<(), DomainError> {
        let leaf_count = self.leaf_count();
        let expected_leaves = self.nodes.iter().filter(|n| n.id.is_leaf()).count();
        if leaf_count != expected_leaves {
            return Err(DomainError::LeafCountMismatch {
                expected: expected_leaves,
                actual: leaf_count,
            });
        }

        let expected_roots = leaf_count.count_ones() as usize;
        let roots = self.root_count();
        if roots != expected_roots {
            return Err(DomainError::RootCountMismatch {
                leaf_count,
                expected: expected_roots,
                actual: roots,
            });
        }

        for node in &self.nodes {
            match node.parent {
                None if !node.is_root => return Err(DomainError::OrphanNode(node.id)),
                Some(_) if node.is_root => {
                    return Err(DomainError::MalformedInternalNode {
                        node: node.id,
                        reason: "root has a parent".into(),
                    })
                }
                _ => {}
            }

            if let Some(children) = node.children {
                if children[0] == children[1] {
                    return Err(DomainError::MalformedInternalNode {
                        node: node.id,
                        reason: "both children are the same node".into(),
                    });
                }
                for child in children {
                    let child_node = self.node(&child).ok_or(DomainError::UnknownNode(child))?;
                    if child_node.parent != Some(node.id) {
                        return Err(DomainError::MalformedInternalNode {
                            node: node.id,
                            reason: format!("child {child} does not point back"),
                        });
                    }
                }
            }
        }

        let expected_edges = 2 * self.internal_count();
        if self.edges.len() != expected_edges {
            return Err(DomainError::EdgeCountMismatch {
                expected: expected_edges,
                actual: self.edges.len(),
            });
        }

        Ok(())
    }
}

pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest, root: NodeId) -> Self {
        let stack = if forest.contains(&root) {
            vec![root]
        } else {
            Vec::new()
        };
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a ForestNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.forest.node(&current)?;
        // Push children in reverse order for left-to-right traversal
        if let Some([left, right]) = node.children {
            self.stack.push(right);
            self.stack.push(left);
        }
        Some(node)
    }
}
