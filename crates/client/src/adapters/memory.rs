// In-memory reference adapters: durable store, identity, cursor surface.
//
// These back the integration tests and any embedder that wants a working
// stack without a real backend. The store mirrors an eventually-consistent
// row store: blind patches against ids that haven't replicated yet succeed
// quietly, and folder/workspace deletes cascade.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use arbor_common::error::{IdentityError, StoreError};
use arbor_common::patch::EntityPatch;
use arbor_common::types::{CurrentUser, EntityKind, Row, UserProfile};
use async_trait::async_trait;
use uuid::Uuid;

use super::{CursorSurface, DurableStore, IdentityProvider};

#[derive(Debug, Default)]
struct MemoryStoreInner {
    rows: HashMap<Uuid, Row>,
    update_log: Vec<(Uuid, EntityPatch)>,
    fail_next_creates: u32,
    fail_next_updates: u32,
    fail_next_deletes: u32,
}

/// In-memory `DurableStore` with a write log for assertions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    /// Make the next `n` create calls fail with `Unavailable`.
    pub fn fail_next_creates(&self, n: u32) {
        if let Ok(mut inner) = self.locked() {
            inner.fail_next_creates = n;
        }
    }

    /// Make the next `n` update calls fail with `Unavailable`.
    pub fn fail_next_updates(&self, n: u32) {
        if let Ok(mut inner) = self.locked() {
            inner.fail_next_updates = n;
        }
    }

    /// Make the next `n` delete calls fail with `Unavailable`.
    pub fn fail_next_deletes(&self, n: u32) {
        if let Ok(mut inner) = self.locked() {
            inner.fail_next_deletes = n;
        }
    }

    /// Every update accepted so far, in arrival order.
    pub fn update_log(&self) -> Vec<(Uuid, EntityPatch)> {
        self.locked().map(|inner| inner.update_log.clone()).unwrap_or_default()
    }

    pub fn updates_for(&self, id: Uuid) -> Vec<EntityPatch> {
        self.update_log()
            .into_iter()
            .filter_map(|(row_id, patch)| (row_id == id).then_some(patch))
            .collect()
    }

    pub fn row(&self, id: Uuid) -> Option<Row> {
        self.locked().ok().and_then(|inner| inner.rows.get(&id).cloned())
    }

    pub fn row_count(&self) -> usize {
        self.locked().map(|inner| inner.rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn fetch(&self, kind: EntityKind, id: Uuid) -> Result<Option<Row>, StoreError> {
        let inner = self.locked()?;
        Ok(inner.rows.get(&id).filter(|row| row.kind() == kind).cloned())
    }

    async fn create(&self, row: Row) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if inner.fail_next_creates > 0 {
            inner.fail_next_creates -= 1;
            return Err(StoreError::Unavailable("injected create failure".into()));
        }
        if inner.rows.contains_key(&row.id()) {
            return Err(StoreError::Rejected(format!("duplicate id {}", row.id())));
        }
        inner.rows.insert(row.id(), row);
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: EntityPatch) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if inner.fail_next_updates > 0 {
            inner.fail_next_updates -= 1;
            return Err(StoreError::Unavailable("injected update failure".into()));
        }

        match (inner.rows.get_mut(&id), &patch) {
            (Some(Row::Workspace(row)), EntityPatch::Workspace(p)) => p.apply_to(row),
            (Some(Row::Folder(row)), EntityPatch::Folder(p)) => p.apply_to(row),
            (Some(Row::File(row)), EntityPatch::File(p)) => p.apply_to(row),
            // Not replicated yet (or a kind mismatch from a stale caller):
            // accept the patch like a 0-row UPDATE would.
            _ => {}
        }

        inner.update_log.push((id, patch));
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if inner.fail_next_deletes > 0 {
            inner.fail_next_deletes -= 1;
            return Err(StoreError::Unavailable("injected delete failure".into()));
        }
        inner.rows.remove(&id);

        match kind {
            EntityKind::Folder => {
                inner.rows.retain(|_, row| !matches!(row, Row::File(f) if f.folder_id == id));
            }
            EntityKind::Workspace => {
                inner.rows.retain(|_, row| match row {
                    Row::Folder(f) => f.workspace_id != id,
                    Row::File(f) => f.workspace_id != id,
                    Row::Workspace(_) => true,
                });
            }
            EntityKind::File => {}
        }
        Ok(())
    }

    async fn add_collaborators(
        &self,
        _workspace_id: Uuid,
        _user_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Identity provider with a fixed user and profile table.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: Option<CurrentUser>,
    profiles: HashMap<Uuid, UserProfile>,
    fail_profiles: bool,
}

impl StaticIdentity {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user), ..Self::default() }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, user_id: Uuid, profile: UserProfile) -> Self {
        self.profiles.insert(user_id, profile);
        self
    }

    /// Make every profile lookup fail, to exercise the degraded
    /// join-without-track path.
    pub fn with_failing_profiles(mut self) -> Self {
        self.fail_profiles = true;
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }

    async fn resolve_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, IdentityError> {
        if self.fail_profiles {
            return Err(IdentityError::ProfileUnavailable {
                user_id,
                reason: "injected profile failure".into(),
            });
        }
        Ok(self.profiles.get(&user_id).cloned())
    }
}

/// One cursor-surface call, as recorded by `RecordingCursors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorEvent {
    Created { collaborator_id: Uuid, label: String, color: String },
    Removed { collaborator_id: Uuid },
}

/// Cursor surface that records calls instead of driving an editor.
#[derive(Debug, Default)]
pub struct RecordingCursors {
    events: Mutex<Vec<CursorEvent>>,
}

impl RecordingCursors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CursorEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Ids with a created cursor that hasn't been removed since.
    pub fn active_cursor_ids(&self) -> Vec<Uuid> {
        let mut active = Vec::new();
        for event in self.events() {
            match event {
                CursorEvent::Created { collaborator_id, .. } => {
                    if !active.contains(&collaborator_id) {
                        active.push(collaborator_id);
                    }
                }
                CursorEvent::Removed { collaborator_id } => {
                    active.retain(|id| *id != collaborator_id);
                }
            }
        }
        active
    }
}

impl CursorSurface for RecordingCursors {
    fn create_cursor(&self, collaborator_id: Uuid, label: &str, color: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(CursorEvent::Created {
                collaborator_id,
                label: label.to_string(),
                color: color.to_string(),
            });
        }
    }

    fn remove_cursor(&self, collaborator_id: Uuid) {
        if let Ok(mut events) = self.events.lock() {
            events.push(CursorEvent::Removed { collaborator_id });
        }
    }
}
