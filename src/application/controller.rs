//! Demo controller: leaf count, transition state machine and selection.
//!
//! The controller is a synchronous state machine. Timing (the visible
//! transition delay and the auto-sequence interval) is driven from outside,
//! see [`crate::application::runtime`]. Calls that are not valid in the
//! current state return [`Rejected`] and leave every field untouched.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::{Forest, ForestBuilder, NodeId};
use crate::infrastructure::traits::SaltSource;

/// Direction of a manual transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Growing,
    Shrinking,
}

/// Sequencing state of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoState {
    Idle,
    Busy(Direction),
    AutoSequencing,
}

impl fmt::Display for DemoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoState::Idle => write!(f, "idle"),
            DemoState::Busy(Direction::Growing) => write!(f, "growing"),
            DemoState::Busy(Direction::Shrinking) => write!(f, "shrinking"),
            DemoState::AutoSequencing => write!(f, "auto-sequencing"),
        }
    }
}

/// Token of one auto-sequence run. Ticks carrying an older token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRun(u64);

/// Why a call was ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("not allowed while {0}")]
    NotIdle(DemoState),

    #[error("the forest cannot shrink below one leaf")]
    AtMinimum,

    #[error("no transition in progress")]
    NotBusy,

    #[error("no auto-sequence is running")]
    NotAutoSequencing,

    #[error("stale auto-sequence tick")]
    StaleTick,

    #[error("no node {0} in the current forest")]
    UnknownNode(NodeId),
}

/// Result of one applied auto-sequence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Built `leaf_count`, more steps follow
    Continue { leaf_count: usize },
    /// Built the last step and returned to idle
    Finished { leaf_count: usize },
}

/// Limits of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoOptions {
    /// Leaf count the controller starts with
    pub initial_leaves: usize,
    /// Auto-sequence stops after building this many leaves
    pub auto_max_leaves: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            initial_leaves: 4,
            auto_max_leaves: 8,
        }
    }
}

/// Read-only view of the controller handed to renderers.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: DemoState,
    pub leaf_count: usize,
    pub forest: Arc<Forest>,
    pub selected: Option<NodeId>,
    /// Incremented on every applied change
    pub revision: u64,
}

/// Owns the current leaf count and forest and guards every transition.
pub struct DemoController {
    builder: ForestBuilder,
    salt: Arc<dyn SaltSource>,
    options: DemoOptions,
    state: DemoState,
    leaf_count: usize,
    forest: Arc<Forest>,
    selected: Option<NodeId>,
    generation: u64,
    next_auto_count: usize,
    revision: u64,
}

impl fmt::Debug for DemoController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoController")
            .field("state", &self.state)
            .field("leaf_count", &self.leaf_count)
            .field("selected", &self.selected)
            .field("generation", &self.generation)
            .field("revision", &self.revision)
            .finish()
    }
}

impl DemoController {
    /// Creates an idle controller showing `options.initial_leaves` leaves.
    pub fn new(builder: ForestBuilder, salt: Arc<dyn SaltSource>, options: DemoOptions) -> Self {
        let mut controller = Self {
            builder,
            salt,
            options,
            state: DemoState::Idle,
            leaf_count: options.initial_leaves,
            forest: Arc::new(Forest::empty()),
            selected: None,
            generation: 0,
            next_auto_count: 1,
            revision: 0,
        };
        controller.rebuild();
        controller
    }

    pub fn state(&self) -> DemoState {
        self.state
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn options(&self) -> &DemoOptions {
        &self.options
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            leaf_count: self.leaf_count,
            forest: Arc::clone(&self.forest),
            selected: self.selected,
            revision: self.revision,
        }
    }

    /// Grows the forest by one leaf and enters `Busy(Growing)`.
    #[instrument(level = "debug", skip(self), fields(leaf_count = self.leaf_count))]
    pub fn add_leaf(&mut self) -> Result<usize, Rejected> {
        self.require_idle()?;
        self.state = DemoState::Busy(Direction::Growing);
        self.leaf_count += 1;
        self.rebuild();
        Ok(self.leaf_count)
    }

    /// Shrinks the forest by one leaf and enters `Busy(Shrinking)`.
    #[instrument(level = "debug", skip(self), fields(leaf_count = self.leaf_count))]
    pub fn remove_leaf(&mut self) -> Result<usize, Rejected> {
        self.require_idle()?;
        if self.leaf_count <= 1 {
            debug!("remove_leaf ignored at minimum");
            return Err(Rejected::AtMinimum);
        }
        self.state = DemoState::Busy(Direction::Shrinking);
        self.leaf_count -= 1;
        self.rebuild();
        Ok(self.leaf_count)
    }

    /// Ends a manual transition once its visible delay has elapsed.
    pub fn finish_transition(&mut self) -> Result<(), Rejected> {
        match self.state {
            DemoState::Busy(direction) => {
                debug!(?direction, "transition finished");
                self.state = DemoState::Idle;
                self.revision += 1;
                Ok(())
            }
            _ => Err(Rejected::NotBusy),
        }
    }

    /// Empties the forest and clears the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> Result<(), Rejected> {
        self.require_idle()?;
        self.leaf_count = 0;
        self.selected = None;
        self.rebuild();
        info!("forest reset");
        Ok(())
    }

    /// Starts a new auto-sequence run, building the one-leaf forest at once.
    ///
    /// The returned token must accompany every later tick of this run. With a
    /// bound of one the run is already finished and the controller is idle.
    #[instrument(level = "debug", skip(self))]
    pub fn start_auto_sequence(&mut self) -> Result<AutoRun, Rejected> {
        self.require_idle()?;
        self.generation += 1;
        self.state = DemoState::AutoSequencing;
        info!(generation = self.generation, "auto-sequence started");
        let run = AutoRun(self.generation);
        self.next_auto_count = 1;
        self.step_auto_sequence();
        Ok(run)
    }

    /// Applies one auto-sequence step if `run` is still the live run.
    #[instrument(level = "debug", skip(self))]
    pub fn auto_tick(&mut self, run: AutoRun) -> Result<TickOutcome, Rejected> {
        if self.state != DemoState::AutoSequencing || run.0 != self.generation {
            debug!(generation = self.generation, "stale tick dropped");
            return Err(Rejected::StaleTick);
        }
        Ok(self.step_auto_sequence())
    }

    fn step_auto_sequence(&mut self) -> TickOutcome {
        self.leaf_count = self.next_auto_count;
        self.rebuild();

        if self.leaf_count >= self.options.auto_max_leaves {
            self.generation += 1;
            self.state = DemoState::Idle;
            info!(leaf_count = self.leaf_count, "auto-sequence finished");
            TickOutcome::Finished {
                leaf_count: self.leaf_count,
            }
        } else {
            self.next_auto_count += 1;
            TickOutcome::Continue {
                leaf_count: self.leaf_count,
            }
        }
    }

    /// Cancels the running auto-sequence, keeping the last built forest.
    #[instrument(level = "debug", skip(self))]
    pub fn stop_auto_sequence(&mut self) -> Result<(), Rejected> {
        if self.state != DemoState::AutoSequencing {
            return Err(Rejected::NotAutoSequencing);
        }
        self.generation += 1;
        self.state = DemoState::Idle;
        self.revision += 1;
        info!(leaf_count = self.leaf_count, "auto-sequence stopped");
        Ok(())
    }

    /// Selects a node of the current forest, or clears the selection.
    pub fn select_node(&mut self, id: Option<NodeId>) -> Result<(), Rejected> {
        match id {
            Some(id) if !self.forest.contains(&id) => {
                debug!(%id, "selection of unknown node ignored");
                Err(Rejected::UnknownNode(id))
            }
            _ => {
                self.selected = id;
                self.revision += 1;
                Ok(())
            }
        }
    }

    /// Selects `id`, or clears the selection if `id` is already selected.
    pub fn toggle_node(&mut self, id: NodeId) -> Result<(), Rejected> {
        if self.selected == Some(id) {
            self.select_node(None)
        } else {
            self.select_node(Some(id))
        }
    }

    fn require_idle(&self) -> Result<(), Rejected> {
        if self.state == DemoState::Idle {
            Ok(())
        } else {
            debug!(state = %self.state, "call ignored outside idle");
            Err(Rejected::NotIdle(self.state))
        }
    }

    /// Replaces the forest with a fresh build for the current leaf count.
    fn rebuild(&mut self) {
        let builder = self.builder.clone().with_salt(self.salt.next_salt());
        self.forest = Arc::new(builder.build(self.leaf_count));
        self.revision += 1;
        debug!(
            leaf_count = self.leaf_count,
            nodes = self.forest.len(),
            roots = self.forest.root_count(),
            "forest rebuilt"
        );
    }
}
