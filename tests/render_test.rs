//! Tests for RenderAdapter and the text, JSON and SVG renderers

use rstest::rstest;
use serde_json::Value;

use forestviz::domain::{Canvas, ForestBuilder, NodeId};
use forestviz::render::{render_text, to_svg, ForestStats, NodeRole, RenderAdapter};

#[rstest]
#[case(0, ForestStats { leaf_count: 0, height: 0, node_count: 0, root_count: 0 })]
#[case(1, ForestStats { leaf_count: 1, height: 1, node_count: 1, root_count: 1 })]
#[case(4, ForestStats { leaf_count: 4, height: 3, node_count: 7, root_count: 1 })]
#[case(6, ForestStats { leaf_count: 6, height: 3, node_count: 10, root_count: 2 })]
#[case(8, ForestStats { leaf_count: 8, height: 4, node_count: 15, root_count: 1 })]
fn given_leaf_count_when_computing_stats_then_recomputed_from_forest(
    #[case] leaves: usize,
    #[case] expected: ForestStats,
) {
    let forest = ForestBuilder::default().build(leaves);
    assert_eq!(RenderAdapter::new(&forest, None).stats(), expected);
}

#[test]
fn given_five_leaves_when_classifying_then_roles_follow_precedence() {
    let forest = ForestBuilder::default().build(5);
    let adapter = RenderAdapter::new(&forest, None);

    assert_eq!(adapter.role(&NodeId::Leaf(0)), Some(NodeRole::Leaf));
    assert_eq!(adapter.role(&NodeId::Internal(0)), Some(NodeRole::Internal));
    assert_eq!(adapter.role(&NodeId::Internal(2)), Some(NodeRole::Root));
    // promoted leaf: root role, leaf glyph
    assert_eq!(adapter.role(&NodeId::Leaf(4)), Some(NodeRole::Root));
    let glyphs: Vec<(NodeId, char)> = adapter.nodes().iter().map(|n| (n.id, n.glyph)).collect();
    assert!(glyphs.contains(&(NodeId::Leaf(4), 'L')));
    assert!(glyphs.contains(&(NodeId::Internal(2), 'R')));
    assert!(glyphs.contains(&(NodeId::Internal(0), 'N')));
}

#[test]
fn given_selected_internal_node_when_detailing_then_links_reported() {
    let forest = ForestBuilder::default().with_salt(9).build(4);
    let adapter = RenderAdapter::new(&forest, Some(NodeId::Internal(0)));

    let details = adapter.details().expect("details");
    assert_eq!(details.role, NodeRole::Internal);
    assert_eq!(details.level, 1);
    assert_eq!(details.parent, Some(NodeId::Internal(2)));
    assert_eq!(details.children, Some([NodeId::Leaf(0), NodeId::Leaf(1)]));
    assert_eq!(details.fingerprint.len(), 8);

    let scene = adapter.scene();
    let selected: Vec<NodeId> = scene.nodes.iter().filter(|n| n.selected).map(|n| n.id).collect();
    assert_eq!(selected, vec![NodeId::Internal(0)]);
    assert_eq!(scene.edges.len(), 6);
}

#[test]
fn given_no_selection_when_building_scene_then_no_details() {
    let forest = ForestBuilder::default().build(3);
    assert_eq!(RenderAdapter::new(&forest, None).scene().details, None);
}

#[test]
fn given_forest_when_rendering_svg_then_one_node_circle_per_node() {
    let forest = ForestBuilder::default().build(7);
    let canvas = Canvas::default();
    let svg = to_svg(&RenderAdapter::new(&forest, None).scene(), &canvas);

    assert_eq!(svg.matches(r#"r="16""#).count(), forest.len());
    assert_eq!(svg.matches("<line ").count(), forest.edges().len());
    assert!(svg.contains(r#"width="800" height="400""#));
    assert!(svg.contains("Root Node"));
}

#[test]
fn given_three_leaves_when_rendering_text_then_largest_tree_first() {
    let forest = ForestBuilder::default().build(3);
    let text = render_text(&forest);

    let node0 = text.find("node-0").expect("node-0 rendered");
    let leaf2 = text.rfind("leaf-2").expect("leaf-2 rendered");
    assert!(node0 < leaf2);
    assert_eq!(text.matches("leaf-").count(), 3);
}

#[test]
fn given_scene_when_serializing_then_ids_and_roles_are_strings() {
    let forest = ForestBuilder::default().build(2);
    let scene = RenderAdapter::new(&forest, Some(NodeId::Leaf(1))).scene();

    let json: Value = serde_json::to_value(&scene).expect("serialize");
    assert_eq!(json["nodes"][0]["id"], "leaf-0");
    assert_eq!(json["nodes"][2]["role"], "root");
    assert_eq!(json["details"]["id"], "leaf-1");
    assert_eq!(json["details"]["parent"], "node-0");
    assert_eq!(json["stats"]["root_count"], 1);
}
