//! Tests for ForestBuilder

use std::collections::HashSet;

use rstest::rstest;

use forestviz::domain::{Canvas, ForestBuilder, NodeId, Position};
use forestviz::util::testing;

#[rstest]
#[case(1, 1)]
#[case(2, 1)]
#[case(3, 2)]
#[case(4, 1)]
#[case(5, 2)]
#[case(6, 2)]
#[case(7, 3)]
#[case(8, 1)]
#[case(11, 3)]
#[case(15, 4)]
#[case(31, 5)]
#[case(64, 1)]
fn given_leaf_count_when_building_then_one_root_per_set_bit(
    #[case] leaves: usize,
    #[case] roots: usize,
) {
    testing::init_test_setup();
    let forest = ForestBuilder::default().build(leaves);

    assert_eq!(forest.root_count(), roots);
    assert_eq!(forest.leaf_count(), leaves);
    assert!(forest.validate().is_ok(), "{:?}", forest.validate());
}

#[test]
fn given_counts_up_to_64_when_building_then_invariants_hold() {
    testing::init_test_setup();
    let builder = ForestBuilder::default();

    for n in 1..=64usize {
        let forest = builder.build(n);
        let internal = forest.internal_count();

        assert_eq!(forest.root_count(), n.count_ones() as usize, "n = {n}");
        // a forest of perfect trees has one internal node per merge
        assert_eq!(internal, n - n.count_ones() as usize, "n = {n}");
        assert_eq!(forest.edges().len(), 2 * internal, "n = {n}");
        assert_eq!(forest.len(), n + internal, "n = {n}");

        let ids: HashSet<NodeId> = forest.nodes().iter().map(|node| node.id).collect();
        assert_eq!(ids.len(), forest.len(), "ids unique for n = {n}");
    }
}

#[test]
fn given_zero_leaves_when_building_then_empty_forest() {
    let forest = ForestBuilder::default().build(0);

    assert!(forest.is_empty());
    assert!(forest.edges().is_empty());
    assert_eq!(forest.root_count(), 0);
    assert_eq!(forest.height(), 0);
    assert!(forest.validate().is_ok());
}

#[test]
fn given_single_leaf_when_building_then_leaf_is_root() {
    let forest = ForestBuilder::default().build(1);

    let leaf = forest.node(&NodeId::Leaf(0)).expect("leaf-0");
    assert!(leaf.is_leaf && leaf.is_root);
    assert_eq!(leaf.parent, None);
    assert!(forest.edges().is_empty());
}

#[test]
fn given_same_count_and_salt_when_building_twice_then_identical() {
    let builder = ForestBuilder::default().with_salt(42);

    let first = builder.build(13);
    let second = builder.build(13);

    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.edges(), second.edges());
}

#[test]
fn given_different_salts_when_building_then_only_fingerprints_differ() {
    let a = ForestBuilder::default().with_salt(1).build(6);
    let b = ForestBuilder::default().with_salt(2).build(6);

    assert_eq!(a.shape(), b.shape());
    assert_ne!(
        a.node(&NodeId::Leaf(0)).map(|n| &n.fingerprint),
        b.node(&NodeId::Leaf(0)).map(|n| &n.fingerprint)
    );
}

#[test]
fn given_four_leaves_when_building_then_single_perfect_tree() {
    let forest = ForestBuilder::default().build(4);

    let roots: Vec<NodeId> = forest.roots().map(|n| n.id).collect();
    assert_eq!(roots, vec![NodeId::Internal(2)]);
    assert_eq!(forest.height(), 3);

    let root = forest.node(&NodeId::Internal(2)).expect("root");
    assert_eq!(root.children, Some([NodeId::Internal(0), NodeId::Internal(1)]));

    let preorder: Vec<String> = forest
        .iter_tree(NodeId::Internal(2))
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(
        preorder,
        vec!["node-2", "node-0", "leaf-0", "leaf-1", "node-1", "leaf-2", "leaf-3"]
    );
}

#[test]
fn given_internal_node_when_building_then_fingerprint_joins_children() {
    use forestviz::domain::fingerprint::join_fingerprint;

    let forest = ForestBuilder::default().with_salt(7).build(2);
    let left = &forest.node(&NodeId::Leaf(0)).expect("leaf-0").fingerprint;
    let right = &forest.node(&NodeId::Leaf(1)).expect("leaf-1").fingerprint;
    let parent = forest.node(&NodeId::Internal(0)).expect("node-0");

    assert_eq!(parent.fingerprint, join_fingerprint(left, right));
}

#[test]
fn given_edges_when_building_then_endpoints_match_node_positions() {
    let forest = ForestBuilder::default().build(7);

    for edge in forest.edges() {
        let from = forest.node(&edge.from).expect("parent");
        let to = forest.node(&edge.to).expect("child");
        assert_eq!(edge.from_position, from.position);
        assert_eq!(edge.to_position, to.position);
        assert_eq!(to.parent, Some(edge.from));
    }
}

#[rstest]
#[case(1)]
#[case(9)]
#[case(40)]
#[case(200)]
fn given_any_count_when_building_then_positions_inside_margins(#[case] leaves: usize) {
    let canvas = Canvas::default();
    let forest = ForestBuilder::new(canvas).build(leaves);

    for node in forest.nodes() {
        let Position { x, y } = node.position;
        assert!(
            x >= canvas.margin - 1e-9 && x <= canvas.width - canvas.margin + 1e-9,
            "{} x = {x}",
            node.id
        );
        assert!(
            y >= canvas.margin - 1e-9 && y <= canvas.height - canvas.margin + 1e-9,
            "{} y = {y}",
            node.id
        );
    }
}

#[test]
fn given_promoted_leaf_when_building_then_level_rises_once() {
    let forest = ForestBuilder::default().build(3);

    let leaf = forest.node(&NodeId::Leaf(2)).expect("leaf-2");
    assert_eq!(leaf.level, 1);
    assert!(leaf.is_root);

    let row: Vec<NodeId> = forest
        .nodes()
        .iter()
        .filter(|n| n.level == 1)
        .map(|n| n.id)
        .collect();
    assert_eq!(row.len(), 2);
    // new parent sits left of the promoted node
    let parent_x = forest.node(&NodeId::Internal(0)).expect("node-0").position.x;
    assert!(parent_x < leaf.position.x);
}
