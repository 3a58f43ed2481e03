// External collaborator seams.
//
// The core treats the durable store, the presence transport, the rich-text
// engine, and identity resolution as black boxes behind these traits.
// `memory` and `loopback` provide in-process implementations for tests and
// embedders that want a working stack without wiring real backends.

pub mod loopback;
pub mod memory;

use arbor_common::error::{IdentityError, PresenceError, StoreError};
use arbor_common::patch::EntityPatch;
use arbor_common::presence::{PresencePayload, TopicState};
use arbor_common::types::{CurrentUser, EntityKind, Row, UserProfile};
use async_trait::async_trait;
use uuid::Uuid;

/// Async CRUD over flat entity rows. Eventually consistent; concurrent
/// writers race at the field level and the last write wins.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn fetch(&self, kind: EntityKind, id: Uuid) -> Result<Option<Row>, StoreError>;

    async fn create(&self, row: Row) -> Result<(), StoreError>;

    async fn update(&self, id: Uuid, patch: EntityPatch) -> Result<(), StoreError>;

    /// Delete a row. Deleting a folder must cascade to its files; deleting
    /// a workspace must cascade to everything beneath it.
    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError>;

    /// Grant the listed users access to a shared workspace.
    async fn add_collaborators(
        &self,
        workspace_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), StoreError>;
}

/// Entry point to the presence transport: one channel per document topic.
#[async_trait]
pub trait PresenceHub: Send + Sync {
    async fn join(&self, topic: &str) -> Result<Box<dyn PresenceChannel>, PresenceError>;
}

/// A joined presence topic. Sync events are full-state replacements, so
/// out-of-order delivery cannot corrupt the roster — the last one wins.
#[async_trait]
pub trait PresenceChannel: Send {
    /// Start the subscription; sync events flow after this resolves.
    async fn subscribe(&mut self) -> Result<(), PresenceError>;

    /// Publish the local user's presence payload to every subscriber.
    async fn track(&mut self, payload: PresencePayload) -> Result<(), PresenceError>;

    /// Next roster sync event, or `None` once the channel is closed.
    async fn next_sync(&mut self) -> Option<TopicState>;

    /// Leave the topic, releasing the subscription and any tracked payload.
    async fn leave(&mut self) -> Result<(), PresenceError>;
}

/// The collaborative editor's cursor-marker surface. Creating a marker for
/// an already-known peer is a harmless upsert.
pub trait CursorSurface: Send + Sync {
    fn create_cursor(&self, collaborator_id: Uuid, label: &str, color: &str);

    fn remove_cursor(&self, collaborator_id: Uuid);
}

/// Who is using this client, and what do they look like.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<CurrentUser>;

    async fn resolve_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, IdentityError>;
}
