//! Domain layer: forest model and layout engine
//!
//! This layer is independent of external concerns (no I/O, no clock, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod fingerprint;
pub mod forest;
pub mod layout;

pub use arena::ForestArena;
pub use builder::ForestBuilder;
pub use entities::*;
pub use error::DomainError;
pub use forest::{Forest, NodeShape};
pub use layout::Canvas;
