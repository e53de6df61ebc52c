//! Drives a [`DemoController`] on a single tokio task.
//!
//! The task owns the controller and is the only place the model is mutated.
//! It multiplexes commands from [`DemoHandle`]s with the transition deadline
//! and the auto-sequence interval. Stopping an auto-sequence drops the
//! interval in the same task that applies ticks, so no tick of a stopped run
//! can apply after `stop_auto_sequence` has answered.
//! When every handle is dropped, the task shuts down.

use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, instrument, trace};

use crate::application::controller::{
    AutoRun, DemoController, DemoState, Rejected, Snapshot, TickOutcome,
};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::NodeId;

type Reply<T> = oneshot::Sender<T>;

/// Result of a controller call: applied, or ignored with a reason.
pub type Outcome<T> = Result<T, Rejected>;

const COMMAND_BUFFER: usize = 32;

// tokio intervals must not have a zero period
const MIN_AUTO_INTERVAL: Duration = Duration::from_millis(1);

/// Delays the runtime applies between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Minimum time a manual add/remove keeps the controller busy
    pub transition_delay: Duration,
    /// Period between auto-sequence steps
    pub auto_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_millis(300),
            auto_interval: Duration::from_millis(1000),
        }
    }
}

/// Cloneable handle to a running demo.
#[derive(Clone, Debug)]
pub struct DemoHandle {
    channel: mpsc::Sender<DemoMessage>,
}

/// Internal representation of messages sent by `DemoHandle` to the driver.
enum DemoMessage {
    AddLeaf(Reply<Outcome<usize>>),
    RemoveLeaf(Reply<Outcome<usize>>),
    Reset(Reply<Outcome<()>>),
    StartAuto(Reply<Outcome<()>>),
    StopAuto(Reply<Outcome<()>>),
    Select(Option<NodeId>, Reply<Outcome<()>>),
    Toggle(NodeId, Reply<Outcome<()>>),
    Snapshot(Reply<Snapshot>),
}

/// What woke the driver loop.
enum Wake {
    Message(Option<DemoMessage>),
    TransitionDone,
    Tick(AutoRun),
}

struct Driver {
    controller: DemoController,
    timing: Timing,
    snapshots: watch::Sender<Snapshot>,
    transition_deadline: Option<Instant>,
    auto: Option<(AutoRun, Interval)>,
}

/// Spawns the driver task onto the current tokio runtime.
///
/// Returns a handle for commands and a receiver that observes every applied
/// change of the controller.
pub fn spawn(
    controller: DemoController,
    timing: Timing,
) -> (DemoHandle, watch::Receiver<Snapshot>) {
    let (handle, snapshots, _task) = spawn_with_task(controller, timing);
    (handle, snapshots)
}

/// Like [`spawn`], also returning the driver's join handle.
pub fn spawn_with_task(
    controller: DemoController,
    timing: Timing,
) -> (DemoHandle, watch::Receiver<Snapshot>, JoinHandle<()>) {
    let (cmd_sender, cmd_receiver) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_sender, snapshot_receiver) = watch::channel(controller.snapshot());

    let driver = Driver {
        controller,
        timing,
        snapshots: snapshot_sender,
        transition_deadline: None,
        auto: None,
    };
    let task = tokio::spawn(driver.run(cmd_receiver));

    (
        DemoHandle {
            channel: cmd_sender,
        },
        snapshot_receiver,
        task,
    )
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::Receiver<DemoMessage>) {
        loop {
            let wake = tokio::select! {
                maybe_cmd = commands.recv() => Wake::Message(maybe_cmd),
                _ = transition_elapsed(self.transition_deadline) => Wake::TransitionDone,
                run = next_tick(&mut self.auto) => Wake::Tick(run),
            };

            match wake {
                Wake::Message(Some(msg)) => self.handle_command(msg),
                // every handle was dropped, shut down the demo
                Wake::Message(None) => break,
                Wake::TransitionDone => self.finish_transition(),
                Wake::Tick(run) => self.tick(run),
            }
            self.publish();
        }
        debug!("demo runtime shut down");
    }

    fn handle_command(&mut self, msg: DemoMessage) {
        match msg {
            DemoMessage::AddLeaf(reply) => {
                let outcome = self.controller.add_leaf();
                if outcome.is_ok() {
                    self.begin_transition();
                }
                let _ = reply.send(outcome);
            }
            DemoMessage::RemoveLeaf(reply) => {
                let outcome = self.controller.remove_leaf();
                if outcome.is_ok() {
                    self.begin_transition();
                }
                let _ = reply.send(outcome);
            }
            DemoMessage::Reset(reply) => {
                let _ = reply.send(self.controller.reset());
            }
            DemoMessage::StartAuto(reply) => {
                let outcome = self.controller.start_auto_sequence().map(|run| {
                    if self.controller.state() == DemoState::AutoSequencing {
                        // step one is already built, the next is due one period later
                        let period = self.timing.auto_interval.max(MIN_AUTO_INTERVAL);
                        let mut interval = time::interval_at(Instant::now() + period, period);
                        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        self.auto = Some((run, interval));
                    }
                });
                let _ = reply.send(outcome);
            }
            DemoMessage::StopAuto(reply) => {
                let outcome = self.controller.stop_auto_sequence();
                if outcome.is_ok() {
                    self.auto = None;
                }
                let _ = reply.send(outcome);
            }
            DemoMessage::Select(id, reply) => {
                let _ = reply.send(self.controller.select_node(id));
            }
            DemoMessage::Toggle(id, reply) => {
                let _ = reply.send(self.controller.toggle_node(id));
            }
            DemoMessage::Snapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
            }
        }
    }

    fn begin_transition(&mut self) {
        self.transition_deadline = Some(Instant::now() + self.timing.transition_delay);
    }

    fn finish_transition(&mut self) {
        self.transition_deadline = None;
        if let Err(reason) = self.controller.finish_transition() {
            debug!(%reason, "transition deadline without transition");
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn tick(&mut self, run: AutoRun) {
        match self.controller.auto_tick(run) {
            Ok(TickOutcome::Continue { leaf_count }) => {
                trace!(leaf_count, "auto-sequence step");
            }
            Ok(TickOutcome::Finished { leaf_count }) => {
                trace!(leaf_count, "auto-sequence last step");
                self.auto = None;
            }
            Err(reason) => {
                debug!(%reason, "auto-sequence tick dropped");
                self.auto = None;
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if current.revision == snapshot.revision {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

async fn transition_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn next_tick(auto: &mut Option<(AutoRun, Interval)>) -> AutoRun {
    match auto {
        Some((run, interval)) => {
            interval.tick().await;
            *run
        }
        None => future::pending().await,
    }
}

impl DemoHandle {
    /// Grows the forest by one leaf, returning the new leaf count.
    pub async fn add_leaf(&self) -> ApplicationResult<Outcome<usize>> {
        self.request(DemoMessage::AddLeaf).await
    }

    /// Shrinks the forest by one leaf, returning the new leaf count.
    pub async fn remove_leaf(&self) -> ApplicationResult<Outcome<usize>> {
        self.request(DemoMessage::RemoveLeaf).await
    }

    pub async fn reset(&self) -> ApplicationResult<Outcome<()>> {
        self.request(DemoMessage::Reset).await
    }

    pub async fn start_auto_sequence(&self) -> ApplicationResult<Outcome<()>> {
        self.request(DemoMessage::StartAuto).await
    }

    /// Stops the auto-sequence. Once this returns, no further step applies.
    pub async fn stop_auto_sequence(&self) -> ApplicationResult<Outcome<()>> {
        self.request(DemoMessage::StopAuto).await
    }

    pub async fn select_node(&self, id: Option<NodeId>) -> ApplicationResult<Outcome<()>> {
        self.request(|reply| DemoMessage::Select(id, reply)).await
    }

    pub async fn toggle_node(&self, id: NodeId) -> ApplicationResult<Outcome<()>> {
        self.request(|reply| DemoMessage::Toggle(id, reply)).await
    }

    pub async fn snapshot(&self) -> ApplicationResult<Snapshot> {
        self.request(DemoMessage::Snapshot).await
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(Reply<T>) -> DemoMessage,
    ) -> ApplicationResult<T> {
        let (reply, response) = oneshot::channel();
        self.channel
            .send(message(reply))
            .await
            .map_err(|_| ApplicationError::RuntimeClosed)?;
        response.await.map_err(|_| ApplicationError::RuntimeClosed)
    }
}
