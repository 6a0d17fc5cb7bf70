use crate::peer::{PeerCommand, PeerState};
use meshroom_core::Role;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Orchestrator-side view of one running peer task.
pub struct PeerHandle<T> {
    pub(crate) role: Role,
    pub(crate) generation: u64,
    pub(crate) commands: mpsc::UnboundedSender<PeerCommand<T>>,
    pub(crate) state: watch::Receiver<PeerState>,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

impl<T> PeerHandle<T> {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> PeerState {
        *self.state.borrow()
    }

    /// The task has torn down (or is about to) even if its report has not
    /// been processed yet.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished() || self.state() == PeerState::Closed
    }

    /// Queues a command. A task that already stopped drops it.
    pub(crate) fn send(&self, cmd: PeerCommand<T>) {
        if self.commands.send(cmd).is_err() {
            debug!(generation = self.generation, "Peer task already stopped, command dropped");
        }
    }

    /// Signals the task to tear down. Any operation still in flight is
    /// abandoned and its result discarded.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }
}
