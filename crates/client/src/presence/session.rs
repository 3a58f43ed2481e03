// Presence session lifecycle for one open document.
//
// Scoped acquisition: `open` joins and subscribes the topic, performs the
// track handshake at most once, and spawns the sync loop; `close` (or
// dropping the handle) always leaves the topic, so a subscription can never
// leak across document switches. Profile-resolution failure degrades to
// join-without-track: the local user is invisible to peers but still sees
// everyone — collaboration stays an enhancement, never a dependency.

use std::sync::Arc;

use arbor_common::error::PresenceError;
use arbor_common::presence::{Collaborator, PresencePayload};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::{CursorSurface, IdentityProvider, PresenceChannel, PresenceHub};

use super::roster::{flatten_roster, CursorTracker};

/// Live presence for one document. One per open document view.
pub struct PresenceSession {
    topic: String,
    tracked: bool,
    roster_rx: watch::Receiver<Vec<Collaborator>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PresenceSession {
    /// Join the document's topic and start the sync loop.
    ///
    /// Errors mean collaboration is unavailable for this session; the
    /// caller keeps tree browsing and editing alive regardless.
    pub async fn open(
        hub: &dyn PresenceHub,
        document_id: Uuid,
        identity: &dyn IdentityProvider,
        cursors: Arc<dyn CursorSurface>,
    ) -> Result<Self, PresenceError> {
        let topic = document_id.to_string();
        let mut channel = hub.join(&topic).await?;
        channel.subscribe().await?;

        let local_user = identity.current_user();
        let tracked = match &local_user {
            Some(user) => {
                match identity.resolve_profile(user.id).await {
                    Ok(Some(profile)) => {
                        let payload = PresencePayload {
                            id: user.id,
                            email: user.email.clone(),
                            avatar_url: profile.avatar_url,
                        };
                        match channel.track(payload).await {
                            Ok(()) => true,
                            Err(error) => {
                                warn!(%topic, %error, "presence track failed, staying invisible");
                                false
                            }
                        }
                    }
                    Ok(None) => {
                        warn!(%topic, user_id = %user.id, "no profile found, joining untracked");
                        false
                    }
                    Err(error) => {
                        warn!(%topic, %error, "profile resolution failed, joining untracked");
                        false
                    }
                }
            }
            None => {
                debug!(%topic, "no signed-in user, joining untracked");
                false
            }
        };

        let (roster_tx, roster_rx) = watch::channel(Vec::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let local_id = local_user.map(|user| user.id);
        let task =
            tokio::spawn(run(channel, topic.clone(), roster_tx, cursors, local_id, shutdown_rx));

        info!(%topic, tracked, "presence session opened");
        Ok(Self { topic, tracked, roster_rx, shutdown_tx: Some(shutdown_tx), task: Some(task) })
    }

    /// Whether the local user's payload was published to peers. `false`
    /// means the degraded join-without-track state.
    pub fn is_tracking(&self) -> bool {
        self.tracked
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Collaborators currently viewing the document, per the latest sync.
    pub fn roster(&self) -> Vec<Collaborator> {
        self.roster_rx.borrow().clone()
    }

    pub fn subscribe_roster(&self) -> watch::Receiver<Vec<Collaborator>> {
        self.roster_rx.clone()
    }

    /// Leave the topic and wait for the sync loop to finish.
    pub async fn close(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PresenceSession {
    fn drop(&mut self) {
        // The sync loop leaves the topic on its way out.
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

async fn run(
    mut channel: Box<dyn PresenceChannel>,
    topic: String,
    roster_tx: watch::Sender<Vec<Collaborator>>,
    cursors: Arc<dyn CursorSurface>,
    local_id: Option<Uuid>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut tracker = CursorTracker::new();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            sync = channel.next_sync() => match sync {
                Some(state) => {
                    let roster = flatten_roster(&state);
                    let diff = tracker.diff(&roster, local_id, &mut rand::thread_rng());
                    for spec in diff.created {
                        cursors.create_cursor(spec.collaborator_id, &spec.label, &spec.color);
                    }
                    for collaborator_id in diff.removed {
                        cursors.remove_cursor(collaborator_id);
                    }
                    let _ = roster_tx.send(roster);
                }
                None => {
                    debug!(%topic, "presence channel closed by hub");
                    break;
                }
            }
        }
    }

    if let Err(error) = channel.leave().await {
        warn!(%topic, %error, "failed to leave presence topic");
    }
}
