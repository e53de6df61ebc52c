/*
Renders a forest as one termtree per root.

termtree's `Tree` is a foreign type, so conversion goes through a local trait
rather than an inherent impl (E0116).
 */
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Forest, ForestNode, NodeId};
use crate::render::scene::{glyph, NodeRole};

pub trait TreeNodeConvert {
    /// One tree per root, largest tree first.
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for Forest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn build_tree(forest: &Forest, id: NodeId) -> Option<Tree<String>> {
            let node = forest.node(&id)?;
            let leaves: Vec<_> = node
                .children
                .into_iter()
                .flatten()
                .filter_map(|child| build_tree(forest, child))
                .collect();
            Some(Tree::new(label(node)).with_leaves(leaves))
        }

        self.roots()
            .filter_map(|root| build_tree(self, root.id))
            .collect()
    }
}

fn label(node: &ForestNode) -> String {
    let role = match NodeRole::of(node) {
        NodeRole::Root => " root",
        _ => "",
    };
    format!(
        "[{}] {} {}{}",
        glyph(node),
        node.id,
        node.fingerprint,
        role
    )
}

/// Text view of the whole forest, one block per tree.
pub fn render_text(forest: &Forest) -> String {
    if forest.is_empty() {
        return "(empty forest)\n".to_string();
    }
    // each tree ends with its own newline
    forest.to_tree_strings().iter().join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForestBuilder;

    #[test]
    fn given_three_leaves_when_rendered_then_two_trees() {
        let forest = ForestBuilder::default().build(3);
        let trees = forest.to_tree_strings();

        assert_eq!(trees.len(), 2);
        assert!(trees[0].root.starts_with("[R] node-0"));
        assert_eq!(trees[0].leaves.len(), 2);
        assert!(trees[1].root.starts_with("[L] leaf-2"));
    }

    #[test]
    fn given_empty_forest_when_rendered_then_placeholder() {
        assert_eq!(render_text(&Forest::empty()), "(empty forest)\n");
    }
}
