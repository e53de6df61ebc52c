use generational_arena::{Arena, Index};
use std::collections::HashMap;
use tracing::instrument;

use crate::domain::entities::{Edge, ForestNode, NodeId, Position};
use crate::domain::fingerprint::join_fingerprint;
use crate::domain::forest::Forest;

/// Node payload while a forest is under construction.
#[derive(Debug)]
pub struct ArenaNode {
    pub id: NodeId,
    pub level: usize,
    pub position: Position,
    pub fingerprint: String,
    /// Index of parent node in the arena, None until the node is joined
    pub parent: Option<Index>,
    /// Left and right child indices, None for leaves
    pub children: Option<[Index; 2]>,
    pub is_root: bool,
}

/// Arena-based scratch space for one build.
///
/// Nodes are addressed by arena index, so promoting a node to the next level
/// mutates the one logical node in place instead of cloning it. The arena is
/// consumed by [`ForestArena::freeze`], which resolves indices to [`NodeId`]s.
#[derive(Debug, Default)]
pub struct ForestArena {
    /// Arena storage for all nodes of the build
    arena: Arena<ArenaNode>,
    /// Creation order, leaves first
    order: Vec<Index>,
    /// Roots in the order they were marked
    roots: Vec<Index>,
}

impl ForestArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_leaf(&mut self, id: NodeId, position: Position, fingerprint: String) -> Index {
        self.insert(ArenaNode {
            id,
            level: 0,
            position,
            fingerprint,
            parent: None,
            children: None,
            is_root: false,
        })
    }

    /// Synthesizes the parent of `left` and `right` and links both ways.
    #[instrument(level = "trace", skip(self))]
    pub fn join(
        &mut self,
        left: Index,
        right: Index,
        id: NodeId,
        level: usize,
        position: Position,
    ) -> Index {
        let fingerprint = join_fingerprint(
            &self.arena[left].fingerprint,
            &self.arena[right].fingerprint,
        );
        let parent_idx = self.insert(ArenaNode {
            id,
            level,
            position,
            fingerprint,
            parent: None,
            children: Some([left, right]),
            is_root: false,
        });

        for child in [left, right] {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = Some(parent_idx);
            }
        }

        parent_idx
    }

    /// Moves an unpaired node up to `level`, keeping its identity.
    #[instrument(level = "trace", skip(self))]
    pub fn promote(&mut self, idx: Index, level: usize, position: Position) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.level = level;
            node.position = position;
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn mark_root(&mut self, idx: Index) {
        if let Some(node) = self.arena.get_mut(idx) {
            if !node.is_root {
                node.is_root = true;
                self.roots.push(idx);
            }
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves arena indices into ids and emits the edge list.
    ///
    /// Edges are generated from final positions, one pair per internal node
    /// in creation order (left edge first).
    #[instrument(level = "debug", skip(self))]
    pub fn freeze(self, salt: u64) -> Forest {
        let id_of = |idx: Index| self.arena[idx].id;

        let nodes: Vec<ForestNode> = self
            .order
            .iter()
            .map(|&idx| {
                let node = &self.arena[idx];
                ForestNode {
                    id: node.id,
                    level: node.level,
                    position: node.position,
                    fingerprint: node.fingerprint.clone(),
                    children: node.children.map(|[l, r]| [id_of(l), id_of(r)]),
                    parent: node.parent.map(id_of),
                    is_root: node.is_root,
                    is_leaf: node.children.is_none(),
                }
            })
            .collect();

        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id, i))
            .collect();

        let position_of = |id: NodeId| nodes[index[&id]].position;
        let edges: Vec<Edge> = nodes
            .iter()
            .filter_map(|parent| parent.children.map(|children| (parent, children)))
            .flat_map(|(parent, children)| {
                children.into_iter().map(move |child| Edge {
                    from: parent.id,
                    to: child,
                    from_position: parent.position,
                    to_position: position_of(child),
                })
            })
            .collect();

        let roots = self.roots.iter().map(|&idx| id_of(idx)).collect();

        Forest::from_parts(nodes, edges, roots, index, salt)
    }

    fn insert(&mut self, node: ArenaNode) -> Index {
        let idx = self.arena.insert(node);
        self.order.push(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_leaves_when_joined_then_links_both_ways() {
        let mut arena = ForestArena::new();
        let l = arena.insert_leaf(NodeId::Leaf(0), Position::default(), "aa".into());
        let r = arena.insert_leaf(NodeId::Leaf(1), Position::default(), "bb".into());
        let p = arena.join(l, r, NodeId::Internal(0), 1, Position::new(1.0, 2.0));

        assert_eq!(arena.get_node(l).unwrap().parent, Some(p));
        assert_eq!(arena.get_node(r).unwrap().parent, Some(p));
        assert_eq!(arena.get_node(p).unwrap().children, Some([l, r]));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn given_promoted_node_when_frozen_then_same_id_at_new_level() {
        let mut arena = ForestArena::new();
        let idx = arena.insert_leaf(NodeId::Leaf(0), Position::default(), "aa".into());
        arena.promote(idx, 2, Position::new(5.0, 6.0));
        arena.mark_root(idx);

        let forest = arena.freeze(0);
        let node = forest.node(&NodeId::Leaf(0)).unwrap();
        assert_eq!(node.level, 2);
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert!(node.is_root && node.is_leaf);
        assert_eq!(forest.len(), 1);
    }
}
