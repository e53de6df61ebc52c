//! Application layer: demo controller and its runtime
//!
//! This layer sequences domain builds and depends on boundary traits only.

pub mod controller;
pub mod error;
pub mod runtime;

pub use controller::{
    AutoRun, DemoController, DemoOptions, DemoState, Direction, Rejected, Snapshot, TickOutcome,
};
pub use error::{ApplicationError, ApplicationResult};
pub use runtime::{DemoHandle, Outcome, Timing};
