//! forestviz: layout engine and demo driver for the forest of perfect binary
//! trees behind a Utreexo-style accumulator.
//!
//! Layers, innermost first:
//! - [`domain`]: forest model, builder and layout (pure)
//! - [`application`]: demo controller and its tokio runtime
//! - [`render`]: read-only scene, text, JSON and SVG views
//! - [`infrastructure`]: boundary implementations and wiring
//! - [`cli`]: the `forestviz` binary's commands

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
