//! Read-only presentation view over one forest.

use std::fmt;

use serde::Serialize;

use crate::domain::{Forest, ForestNode, NodeId, Position};

/// Visual role of a node. A leaf that is also a root is a `Root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Root,
    Leaf,
    Internal,
}

impl NodeRole {
    pub fn of(node: &ForestNode) -> Self {
        if node.is_root {
            NodeRole::Root
        } else if node.is_leaf {
            NodeRole::Leaf
        } else {
            NodeRole::Internal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeRole::Root => "Root",
            NodeRole::Leaf => "Leaf",
            NodeRole::Internal => "Internal",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single-letter label drawn inside a node.
///
/// Leaf-ness wins over root-ness here, unlike [`NodeRole`]: a promoted leaf
/// is coloured as a root but still reads `L`.
pub fn glyph(node: &ForestNode) -> char {
    if node.is_leaf {
        'L'
    } else if node.is_root {
        'R'
    } else {
        'N'
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub position: Position,
    pub level: usize,
    pub role: NodeRole,
    pub glyph: char,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub from_position: Position,
    pub to_position: Position,
}

/// Summary numbers shown above the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ForestStats {
    pub leaf_count: usize,
    /// Occupied rows: max level + 1, 0 when empty
    pub height: usize,
    pub node_count: usize,
    pub root_count: usize,
}

impl fmt::Display for ForestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Leaves: {} | Height: {} | Nodes: {} | Roots: {}",
            self.leaf_count, self.height, self.node_count, self.root_count
        )
    }
}

/// Details panel content for the selected node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetails {
    pub id: NodeId,
    pub role: NodeRole,
    pub level: usize,
    pub fingerprint: String,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<[NodeId; 2]>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub stats: ForestStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<NodeDetails>,
}

/// Derives presentation data from a forest and the current selection.
///
/// Holds no state of its own; every call recomputes from the forest.
#[derive(Debug, Clone, Copy)]
pub struct RenderAdapter<'a> {
    forest: &'a Forest,
    selected: Option<NodeId>,
}

impl<'a> RenderAdapter<'a> {
    pub fn new(forest: &'a Forest, selected: Option<NodeId>) -> Self {
        Self { forest, selected }
    }

    pub fn forest(&self) -> &'a Forest {
        self.forest
    }

    pub fn role(&self, id: &NodeId) -> Option<NodeRole> {
        self.forest.node(id).map(NodeRole::of)
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn nodes(&self) -> Vec<SceneNode> {
        self.forest
            .nodes()
            .iter()
            .map(|node| SceneNode {
                id: node.id,
                position: node.position,
                level: node.level,
                role: NodeRole::of(node),
                glyph: glyph(node),
                selected: self.is_selected(&node.id),
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<SceneEdge> {
        self.forest
            .edges()
            .iter()
            .map(|edge| SceneEdge {
                from: edge.from,
                to: edge.to,
                from_position: edge.from_position,
                to_position: edge.to_position,
            })
            .collect()
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats {
            leaf_count: self.forest.leaf_count(),
            height: self.forest.height(),
            node_count: self.forest.len(),
            root_count: self.forest.root_count(),
        }
    }

    /// Details of the selected node, None if nothing is selected or the
    /// selection is not part of this forest.
    pub fn details(&self) -> Option<NodeDetails> {
        let node = self.forest.node(self.selected.as_ref()?)?;
        Some(NodeDetails {
            id: node.id,
            role: NodeRole::of(node),
            level: node.level,
            fingerprint: node.fingerprint.clone(),
            position: node.position,
            parent: node.parent,
            children: node.children,
        })
    }

    pub fn scene(&self) -> Scene {
        Scene {
            nodes: self.nodes(),
            edges: self.edges(),
            stats: self.stats(),
            details: self.details(),
        }
    }
}

impl fmt::Display for NodeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node:        {}", self.id)?;
        writeln!(f, "Type:        {}", self.role)?;
        writeln!(f, "Level:       {}", self.level)?;
        writeln!(f, "Fingerprint: {}", self.fingerprint)?;
        writeln!(f, "Position:    {}", self.position)?;
        if let Some(parent) = self.parent {
            writeln!(f, "Parent:      {parent}")?;
        }
        if let Some([left, right]) = self.children {
            writeln!(f, "Children:    {left}, {right}")?;
        }
        Ok(())
    }
}
