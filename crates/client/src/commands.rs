// Command layer: UI intents become store dispatches plus durable writes.
//
// Creation is optimistic — the entity gets a fresh id and lands in the tree
// before the durable write is even acknowledged, and stays there if that
// write fails (the error surfaces to the caller, not as a rollback).
// Body/title edits go through `stage_*_update`: the tree takes the new
// value immediately, the save scheduler debounces the durable write.

use anyhow::{bail, Context, Result};
use arbor_common::patch::{EntityPatch, FilePatch, FolderPatch, WorkspacePatch};
use arbor_common::types::{
    EntityKind, File, Folder, Row, Workspace, WorkspacePermissions,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::adapters::{DurableStore, IdentityProvider};
use crate::persist::SaveScheduler;
use crate::tree::{FolderNode, TreeAction, TreeStore, WorkspaceNode};

const DEFAULT_WORKSPACE_ICON: &str = "💼";
const DEFAULT_FOLDER_ICON: &str = "📁";
const DEFAULT_FILE_ICON: &str = "📄";

/// Parameters for `create_workspace`.
#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    pub title: String,
    pub permissions: WorkspacePermissions,
    /// Initial collaborators; required non-empty for a shared workspace.
    pub collaborators: Vec<Uuid>,
}

/// Create a workspace owned by the current user.
pub async fn create_workspace(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    identity: &dyn IdentityProvider,
    request: CreateWorkspace,
) -> Result<Workspace> {
    let user = identity.current_user().context("cannot create a workspace while signed out")?;
    if request.permissions == WorkspacePermissions::Shared && request.collaborators.is_empty() {
        bail!("a shared workspace needs at least one collaborator");
    }

    let workspace = Workspace {
        id: Uuid::new_v4(),
        title: request.title,
        icon_id: DEFAULT_WORKSPACE_ICON.into(),
        created_at: Utc::now(),
        owner_id: user.id,
        data: None,
        in_trash: String::new(),
        banner_url: String::new(),
        logo: None,
    };

    store.dispatch(TreeAction::AddWorkspace {
        workspace: WorkspaceNode::new(workspace.clone()),
    });

    durable
        .create(Row::Workspace(workspace.clone()))
        .await
        .context("failed to persist new workspace")?;

    if request.permissions == WorkspacePermissions::Shared {
        durable
            .add_collaborators(workspace.id, &request.collaborators)
            .await
            .context("failed to share new workspace")?;
    }

    info!(workspace_id = %workspace.id, permissions = ?request.permissions, "workspace created");
    Ok(workspace)
}

/// Create a folder under a workspace.
pub async fn create_folder(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    title: impl Into<String>,
) -> Result<Folder> {
    let folder = Folder {
        id: Uuid::new_v4(),
        workspace_id,
        title: title.into(),
        icon_id: DEFAULT_FOLDER_ICON.into(),
        created_at: Utc::now(),
        data: None,
        in_trash: String::new(),
        banner_url: String::new(),
    };

    store.dispatch(TreeAction::AddFolder {
        workspace_id,
        folder: FolderNode::new(folder.clone()),
    });

    durable.create(Row::Folder(folder.clone())).await.context("failed to persist new folder")?;
    Ok(folder)
}

/// Create a file under a folder.
pub async fn create_file(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    title: impl Into<String>,
) -> Result<File> {
    let file = File {
        id: Uuid::new_v4(),
        folder_id,
        workspace_id,
        title: title.into(),
        icon_id: DEFAULT_FILE_ICON.into(),
        created_at: Utc::now(),
        data: None,
        in_trash: String::new(),
        banner_url: String::new(),
    };

    store.dispatch(TreeAction::AddFile { workspace_id, folder_id, file: file.clone() });

    durable.create(Row::File(file.clone())).await.context("failed to persist new file")?;
    Ok(file)
}

/// Apply a workspace edit locally and queue its debounced durable write.
pub fn stage_workspace_update(
    store: &mut TreeStore,
    scheduler: &SaveScheduler,
    workspace_id: Uuid,
    patch: WorkspacePatch,
) {
    store.dispatch(TreeAction::UpdateWorkspace { workspace_id, patch: patch.clone() });
    scheduler.note_edit((EntityKind::Workspace, workspace_id), EntityPatch::Workspace(patch));
}

/// Apply a folder edit locally and queue its debounced durable write.
pub fn stage_folder_update(
    store: &mut TreeStore,
    scheduler: &SaveScheduler,
    workspace_id: Uuid,
    folder_id: Uuid,
    patch: FolderPatch,
) {
    store.dispatch(TreeAction::UpdateFolder { workspace_id, folder_id, patch: patch.clone() });
    scheduler.note_edit((EntityKind::Folder, folder_id), EntityPatch::Folder(patch));
}

/// Apply a file edit locally and queue its debounced durable write.
pub fn stage_file_update(
    store: &mut TreeStore,
    scheduler: &SaveScheduler,
    workspace_id: Uuid,
    folder_id: Uuid,
    file_id: Uuid,
    patch: FilePatch,
) {
    store.dispatch(TreeAction::UpdateFile {
        workspace_id,
        folder_id,
        file_id,
        patch: patch.clone(),
    });
    scheduler.note_edit((EntityKind::File, file_id), EntityPatch::File(patch));
}
