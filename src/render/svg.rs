//! Standalone SVG document for a scene.

use std::fmt::Write;

use crate::domain::Canvas;
use crate::render::scene::{NodeRole, Scene};

const NODE_RADIUS: f64 = 16.0;
const BACKGROUND: &str = "#0f172a";
const EDGE_STROKE: &str = "#475569";
const TEXT_FILL: &str = "#e5e7eb";

struct RoleStyle {
    fill: &'static str,
    fill_opacity: f64,
    stroke: &'static str,
}

fn style(role: NodeRole) -> RoleStyle {
    match role {
        NodeRole::Root => RoleStyle {
            fill: "#f7931a",
            fill_opacity: 1.0,
            stroke: "#f9a94b",
        },
        NodeRole::Leaf => RoleStyle {
            fill: "#3b82f6",
            fill_opacity: 0.2,
            stroke: "#60a5fa",
        },
        NodeRole::Internal => RoleStyle {
            fill: "#22c55e",
            fill_opacity: 0.2,
            stroke: "#4ade80",
        },
    }
}

/// Renders `scene` on `canvas` as an SVG document.
///
/// Edges are drawn first so nodes cover their endpoints. The selected node
/// gets a thicker outline.
pub fn to_svg(scene: &Scene, canvas: &Canvas) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_svg(&mut out, scene, canvas);
    out
}

fn write_svg(out: &mut String, scene: &Scene, canvas: &Canvas) -> std::fmt::Result {
    let (w, h) = (canvas.width, canvas.height);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;
    writeln!(out, r#"  <rect width="100%" height="100%" fill="{BACKGROUND}"/>"#)?;

    writeln!(out, r#"  <g id="edges" stroke="{EDGE_STROKE}" stroke-width="2">"#)?;
    for edge in &scene.edges {
        writeln!(
            out,
            r#"    <line data-from="{}" data-to="{}" x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
            edge.from,
            edge.to,
            edge.from_position.x,
            edge.from_position.y,
            edge.to_position.x,
            edge.to_position.y
        )?;
    }
    writeln!(out, "  </g>")?;

    writeln!(out, r#"  <g id="nodes" font-family="monospace" font-size="12">"#)?;
    for node in &scene.nodes {
        let s = style(node.role);
        let stroke_width = if node.selected { 4 } else { 2 };
        writeln!(
            out,
            r#"    <g id="{}" class="{}">"#,
            node.id,
            node.role.label().to_lowercase()
        )?;
        writeln!(
            out,
            r#"      <circle cx="{:.1}" cy="{:.1}" r="{NODE_RADIUS}" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="{stroke_width}"/>"#,
            node.position.x, node.position.y, s.fill, s.fill_opacity, s.stroke
        )?;
        writeln!(
            out,
            r#"      <text x="{:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="middle" fill="{TEXT_FILL}">{}</text>"#,
            node.position.x,
            node.position.y + 1.0,
            node.glyph
        )?;
        writeln!(out, "    </g>")?;
    }
    writeln!(out, "  </g>")?;

    write_legend(out, canvas)?;
    writeln!(out, "</svg>")
}

fn write_legend(out: &mut String, canvas: &Canvas) -> std::fmt::Result {
    let x = canvas.width - 130.0;
    writeln!(
        out,
        r#"  <g id="legend" font-family="sans-serif" font-size="11" fill="{TEXT_FILL}">"#
    )?;
    writeln!(out, r#"    <text x="{x:.1}" y="20">Legend</text>"#)?;
    for (row, (role, label)) in [
        (NodeRole::Leaf, "Leaf Node"),
        (NodeRole::Internal, "Internal Node"),
        (NodeRole::Root, "Root Node"),
    ]
    .into_iter()
    .enumerate()
    {
        let y = 36.0 + row as f64 * 16.0;
        let s = style(role);
        writeln!(
            out,
            r#"    <circle cx="{:.1}" cy="{:.1}" r="6" fill="{}" fill-opacity="{}" stroke="{}"/>"#,
            x + 6.0,
            y - 4.0,
            s.fill,
            s.fill_opacity,
            s.stroke
        )?;
        writeln!(out, r#"    <text x="{:.1}" y="{y:.1}">{label}</text>"#, x + 18.0)?;
    }
    writeln!(out, "  </g>")
}
