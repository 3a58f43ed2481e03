// Async driver for the save planner.
//
// One background task per scheduler: it sleeps until the planner's earliest
// deadline, writes whatever came due (one write at a time — the whole core
// is a single logical thread), and publishes the aggregate save status on a
// watch channel for the UI badge. Edits arrive over a command channel, so
// callers never block on I/O.

use std::sync::Arc;
use std::time::Duration;

use arbor_common::patch::{EntityKey, EntityPatch};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::adapters::DurableStore;

use super::planner::{SavePlanner, SaveStatus};

enum Command {
    Edit { key: EntityKey, patch: EntityPatch },
    Flush { done: oneshot::Sender<()> },
    Close,
}

/// Handle to the background save task.
pub struct SaveScheduler {
    tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<SaveStatus>,
    task: Option<JoinHandle<()>>,
}

impl SaveScheduler {
    /// Spawn the save task with the given debounce window.
    pub fn spawn(store: Arc<dyn DurableStore>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::Saved);
        let task = tokio::spawn(run(SavePlanner::new(window), store, rx, status_tx));
        Self { tx, status_rx, task: Some(task) }
    }

    /// Record a field-level edit for eventual durable write. The tree cache
    /// should already hold the optimistic value before this is called.
    pub fn note_edit(&self, key: EntityKey, patch: EntityPatch) {
        let _ = self.tx.send(Command::Edit { key, patch });
    }

    /// Current aggregate status.
    pub fn status(&self) -> SaveStatus {
        *self.status_rx.borrow()
    }

    /// Watch the status badge change over time.
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }

    /// Write everything pending right now and wait for the writes to
    /// resolve. For graceful-shutdown paths that want the data out.
    pub async fn flush(&self) {
        let (done, ack) = oneshot::channel();
        if self.tx.send(Command::Flush { done }).is_ok() {
            let _ = ack.await;
        }
    }

    /// Stop the task, cancelling every armed timer. Queued edits are
    /// dropped — call `flush` first if they should survive.
    pub async fn close(mut self) {
        let _ = self.tx.send(Command::Close);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        // Best effort: make sure no timer fires after the owner is gone.
        let _ = self.tx.send(Command::Close);
    }
}

async fn run(
    mut planner: SavePlanner,
    store: Arc<dyn DurableStore>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<SaveStatus>,
) {
    loop {
        let deadline = planner.next_deadline();
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Edit { key, patch }) => {
                    planner.note_edit_at(key, patch, Instant::now());
                    publish(&status_tx, &planner);
                }
                Some(Command::Flush { done }) => {
                    planner.force_due_at(Instant::now());
                    drain_due(&mut planner, &store, &status_tx).await;
                    let _ = done.send(());
                }
                Some(Command::Close) | None => break,
            },
            _ = sleep_until_or_forever(deadline) => {
                drain_due(&mut planner, &store, &status_tx).await;
            }
        }
    }

    planner.cancel_all();
    publish(&status_tx, &planner);
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

async fn drain_due(
    planner: &mut SavePlanner,
    store: &Arc<dyn DurableStore>,
    status_tx: &watch::Sender<SaveStatus>,
) {
    loop {
        let due = planner.take_due_at(Instant::now());
        if due.is_empty() {
            break;
        }
        publish(status_tx, planner);

        for (key, patch) in due {
            let (kind, id) = key;
            debug!(?kind, %id, "issuing durable write");
            let result = store.update(id, patch).await;
            if let Err(error) = &result {
                warn!(?kind, %id, %error, "durable write failed, keeping edit for retry");
            }
            planner.finish_save_at(key, result.is_ok(), Instant::now());
        }
        publish(status_tx, planner);
    }
}

fn publish(status_tx: &watch::Sender<SaveStatus>, planner: &SavePlanner) {
    let _ = status_tx.send(planner.status());
}
