// Trash lifecycle: Active → Trashed → (Active | Deleted).
//
// Trashing and restoring are plain field updates written immediately (not
// debounced — they're one-shot affordance clicks, not keystrokes). Hard
// delete goes durable-first: only after the backing store acknowledges does
// the entity leave the tree, and the caller gets the route to navigate to
// now that the current view's entity is gone.

use anyhow::{Context, Result};
use arbor_common::patch::{EntityPatch, FilePatch, FolderPatch};
use arbor_common::route::DashboardRoute;
use arbor_common::types::EntityKind;
use tracing::info;
use uuid::Uuid;

use crate::adapters::DurableStore;
use crate::tree::{TreeAction, TreeStore};

/// Marker recorded on a trashed entity, e.g. `Deleted by alice@example.com`.
pub fn trash_marker(email: &str) -> String {
    format!("Deleted by {email}")
}

/// Move a file to the trash.
pub async fn trash_file(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    file_id: Uuid,
    by_email: &str,
) -> Result<()> {
    set_file_trash(store, durable, workspace_id, folder_id, file_id, trash_marker(by_email)).await
}

/// Bring a trashed file back.
pub async fn restore_file(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    file_id: Uuid,
) -> Result<()> {
    set_file_trash(store, durable, workspace_id, folder_id, file_id, String::new()).await
}

/// Move a folder to the trash. Its files stay put — a trashed folder is
/// still addressable until it is hard-deleted.
pub async fn trash_folder(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    by_email: &str,
) -> Result<()> {
    set_folder_trash(store, durable, workspace_id, folder_id, trash_marker(by_email)).await
}

/// Bring a trashed folder back.
pub async fn restore_folder(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
) -> Result<()> {
    set_folder_trash(store, durable, workspace_id, folder_id, String::new()).await
}

/// Hard-delete a file. Returns the workspace route to navigate to.
pub async fn delete_file(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    file_id: Uuid,
) -> Result<DashboardRoute> {
    durable
        .delete(EntityKind::File, file_id)
        .await
        .context("failed to delete file from durable store")?;

    store.dispatch(TreeAction::DeleteFile { workspace_id, folder_id, file_id });
    info!(%file_id, "file hard-deleted");
    Ok(DashboardRoute::workspace(workspace_id))
}

/// Hard-delete a folder and, via the durable store's cascade, everything
/// in it. Returns the workspace route to navigate to.
pub async fn delete_folder(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
) -> Result<DashboardRoute> {
    durable
        .delete(EntityKind::Folder, folder_id)
        .await
        .context("failed to delete folder from durable store")?;

    store.dispatch(TreeAction::DeleteFolder { workspace_id, folder_id });
    info!(%folder_id, "folder hard-deleted");
    Ok(DashboardRoute::workspace(workspace_id))
}

/// Hard-delete a whole workspace. Returns the dashboard root route.
pub async fn delete_workspace(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
) -> Result<DashboardRoute> {
    durable
        .delete(EntityKind::Workspace, workspace_id)
        .await
        .context("failed to delete workspace from durable store")?;

    store.dispatch(TreeAction::DeleteWorkspace { workspace_id });
    info!(%workspace_id, "workspace hard-deleted");
    Ok(DashboardRoute::root())
}

async fn set_file_trash(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    file_id: Uuid,
    marker: String,
) -> Result<()> {
    let patch = FilePatch { in_trash: Some(marker), ..Default::default() };
    store.dispatch(TreeAction::UpdateFile {
        workspace_id,
        folder_id,
        file_id,
        patch: patch.clone(),
    });
    durable
        .update(file_id, EntityPatch::File(patch))
        .await
        .context("failed to persist file trash state")
}

async fn set_folder_trash(
    store: &mut TreeStore,
    durable: &dyn DurableStore,
    workspace_id: Uuid,
    folder_id: Uuid,
    marker: String,
) -> Result<()> {
    let patch = FolderPatch { in_trash: Some(marker), ..Default::default() };
    store.dispatch(TreeAction::UpdateFolder { workspace_id, folder_id, patch: patch.clone() });
    durable
        .update(folder_id, EntityPatch::Folder(patch))
        .await
        .context("failed to persist folder trash state")
}

#[cfg(test)]
mod tests {
    use arbor_common::types::{CurrentUser, WorkspacePermissions};

    use crate::adapters::memory::{MemoryStore, StaticIdentity};
    use crate::commands::{create_file, create_folder, create_workspace, CreateWorkspace};

    use super::*;

    async fn seeded() -> (TreeStore, MemoryStore, Uuid, Uuid, Uuid) {
        let mut store = TreeStore::new();
        let durable = MemoryStore::new();
        let identity = StaticIdentity::signed_in(CurrentUser {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
        });

        let workspace = create_workspace(
            &mut store,
            &durable,
            &identity,
            CreateWorkspace {
                title: "Acme".into(),
                permissions: WorkspacePermissions::Private,
                collaborators: Vec::new(),
            },
        )
        .await
        .unwrap();
        let folder = create_folder(&mut store, &durable, workspace.id, "Docs").await.unwrap();
        let file =
            create_file(&mut store, &durable, workspace.id, folder.id, "Todo").await.unwrap();

        (store, durable, workspace.id, folder.id, file.id)
    }

    fn file_in_trash(store: &TreeStore, ws: Uuid, folder: Uuid, file: Uuid) -> String {
        store
            .state()
            .workspace(ws)
            .unwrap()
            .folder(folder)
            .unwrap()
            .file(file)
            .unwrap()
            .in_trash
            .clone()
    }

    #[tokio::test]
    async fn trash_marks_locally_and_durably() {
        let (mut store, durable, ws, folder, file) = seeded().await;

        trash_file(&mut store, &durable, ws, folder, file, "alice@example.com").await.unwrap();

        assert_eq!(file_in_trash(&store, ws, folder, file), "Deleted by alice@example.com");
        let updates = durable.updates_for(file);
        assert_eq!(updates.len(), 1);

        // Still in the tree: trash is soft.
        assert!(store.state().workspace(ws).unwrap().folder(folder).unwrap().file(file).is_some());
    }

    #[tokio::test]
    async fn restore_clears_the_marker() {
        let (mut store, durable, ws, folder, file) = seeded().await;

        trash_file(&mut store, &durable, ws, folder, file, "alice@example.com").await.unwrap();
        restore_file(&mut store, &durable, ws, folder, file).await.unwrap();

        assert!(file_in_trash(&store, ws, folder, file).is_empty());
        assert_eq!(durable.updates_for(file).len(), 2);
    }

    #[tokio::test]
    async fn folder_trash_round_trip() {
        let (mut store, durable, ws, folder, _) = seeded().await;

        trash_folder(&mut store, &durable, ws, folder, "bob@example.com").await.unwrap();
        assert_eq!(
            store.state().workspace(ws).unwrap().folder(folder).unwrap().row.in_trash,
            "Deleted by bob@example.com"
        );

        restore_folder(&mut store, &durable, ws, folder).await.unwrap();
        assert!(!store.state().workspace(ws).unwrap().folder(folder).unwrap().row.is_trashed());
    }

    #[tokio::test]
    async fn delete_file_removes_everywhere_and_routes_to_workspace() {
        let (mut store, durable, ws, folder, file) = seeded().await;

        let route = delete_file(&mut store, &durable, ws, folder, file).await.unwrap();

        assert_eq!(route, DashboardRoute::workspace(ws));
        assert!(store.state().workspace(ws).unwrap().folder(folder).unwrap().file(file).is_none());
        assert!(durable.row(file).is_none());
    }

    #[tokio::test]
    async fn delete_folder_cascades() {
        let (mut store, durable, ws, folder, file) = seeded().await;

        let route = delete_folder(&mut store, &durable, ws, folder).await.unwrap();

        assert_eq!(route, DashboardRoute::workspace(ws));
        assert!(store.state().workspace(ws).unwrap().folder(folder).is_none());
        // Cascade took the nested file with it durably too.
        assert!(durable.row(file).is_none());
    }

    #[tokio::test]
    async fn failed_durable_delete_leaves_tree_intact() {
        let (mut store, durable, ws, folder, file) = seeded().await;
        durable.fail_next_deletes(1);

        let result = delete_file(&mut store, &durable, ws, folder, file).await;

        assert!(result.is_err());
        // Durable-first ordering: the tree copy survives a failed delete.
        assert!(store.state().workspace(ws).unwrap().folder(folder).unwrap().file(file).is_some());
    }

    #[tokio::test]
    async fn delete_workspace_routes_to_dashboard_root() {
        let (mut store, durable, ws, _, file) = seeded().await;

        let route = delete_workspace(&mut store, &durable, ws).await.unwrap();

        assert_eq!(route, DashboardRoute::root());
        assert!(store.state().workspaces.is_empty());
        assert!(durable.row(file).is_none());
    }
}
