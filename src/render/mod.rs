//! Read-only renderers over a forest
//!
//! Nothing here mutates the model; every output is derived from a [`Scene`].

pub mod scene;
pub mod svg;
pub mod tree;

pub use scene::{glyph, ForestStats, NodeDetails, NodeRole, RenderAdapter, Scene, SceneEdge, SceneNode};
pub use svg::to_svg;
pub use tree::{render_text, TreeNodeConvert};
