// Pure reducer over the tree cache.
//
// `reduce` never mutates its input and upholds two invariants on every
// return: folders within a workspace and files within a folder stay sorted
// ascending by `created_at` (re-established after insert and bulk set, not
// assumed), and an update or delete whose ids don't resolve in the tree is
// a structural no-op — a race with a not-yet-loaded entity, not an error.

use arbor_common::patch::{FilePatch, FolderPatch, WorkspacePatch};
use arbor_common::types::File;
use uuid::Uuid;

use super::{AppState, FolderNode, WorkspaceNode};

/// The closed set of tree mutations. Everything keyed by the full path down
/// from the workspace, so the reducer can never attach an entity to the
/// wrong parent.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeAction {
    /// Replace the whole workspace collection (initial load).
    SetWorkspaces { workspaces: Vec<WorkspaceNode> },
    /// Optimistically add a freshly created workspace.
    AddWorkspace { workspace: WorkspaceNode },
    UpdateWorkspace { workspace_id: Uuid, patch: WorkspacePatch },
    /// Hard delete: physically drop the workspace and everything in it.
    DeleteWorkspace { workspace_id: Uuid },

    /// Replace one workspace's folder list (folder load for that workspace).
    SetFolders { workspace_id: Uuid, folders: Vec<FolderNode> },
    AddFolder { workspace_id: Uuid, folder: FolderNode },
    UpdateFolder { workspace_id: Uuid, folder_id: Uuid, patch: FolderPatch },
    /// Hard delete: the folder's files go with it structurally.
    DeleteFolder { workspace_id: Uuid, folder_id: Uuid },

    AddFile { workspace_id: Uuid, folder_id: Uuid, file: File },
    UpdateFile { workspace_id: Uuid, folder_id: Uuid, file_id: Uuid, patch: FilePatch },
    DeleteFile { workspace_id: Uuid, folder_id: Uuid, file_id: Uuid },
}

impl TreeAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetWorkspaces { .. } => "set_workspaces",
            Self::AddWorkspace { .. } => "add_workspace",
            Self::UpdateWorkspace { .. } => "update_workspace",
            Self::DeleteWorkspace { .. } => "delete_workspace",
            Self::SetFolders { .. } => "set_folders",
            Self::AddFolder { .. } => "add_folder",
            Self::UpdateFolder { .. } => "update_folder",
            Self::DeleteFolder { .. } => "delete_folder",
            Self::AddFile { .. } => "add_file",
            Self::UpdateFile { .. } => "update_file",
            Self::DeleteFile { .. } => "delete_file",
        }
    }
}

/// Apply one action, returning the next state. The input is untouched.
pub fn reduce(state: &AppState, action: TreeAction) -> AppState {
    let mut next = state.clone();

    match action {
        TreeAction::SetWorkspaces { workspaces } => {
            next.workspaces = workspaces;
            for workspace in &mut next.workspaces {
                sort_folders(workspace);
                for folder in &mut workspace.folders {
                    sort_files(folder);
                }
            }
        }
        TreeAction::AddWorkspace { workspace } => {
            next.workspaces.push(workspace);
        }
        TreeAction::UpdateWorkspace { workspace_id, patch } => {
            if let Some(workspace) = workspace_mut(&mut next, workspace_id) {
                patch.apply_to(&mut workspace.row);
            }
        }
        TreeAction::DeleteWorkspace { workspace_id } => {
            next.workspaces.retain(|workspace| workspace.row.id != workspace_id);
        }

        TreeAction::SetFolders { workspace_id, folders } => {
            if let Some(workspace) = workspace_mut(&mut next, workspace_id) {
                workspace.folders = folders;
                sort_folders(workspace);
                for folder in &mut workspace.folders {
                    sort_files(folder);
                }
            }
        }
        TreeAction::AddFolder { workspace_id, folder } => {
            if let Some(workspace) = workspace_mut(&mut next, workspace_id) {
                workspace.folders.push(folder);
                sort_folders(workspace);
            }
        }
        TreeAction::UpdateFolder { workspace_id, folder_id, patch } => {
            if let Some(folder) = folder_mut(&mut next, workspace_id, folder_id) {
                patch.apply_to(&mut folder.row);
            }
        }
        TreeAction::DeleteFolder { workspace_id, folder_id } => {
            if let Some(workspace) = workspace_mut(&mut next, workspace_id) {
                workspace.folders.retain(|folder| folder.row.id != folder_id);
            }
        }

        TreeAction::AddFile { workspace_id, folder_id, file } => {
            if let Some(folder) = folder_mut(&mut next, workspace_id, folder_id) {
                folder.files.push(file);
                sort_files(folder);
            }
        }
        TreeAction::UpdateFile { workspace_id, folder_id, file_id, patch } => {
            if let Some(folder) = folder_mut(&mut next, workspace_id, folder_id) {
                if let Some(file) = folder.files.iter_mut().find(|file| file.id == file_id) {
                    patch.apply_to(file);
                }
            }
        }
        TreeAction::DeleteFile { workspace_id, folder_id, file_id } => {
            if let Some(folder) = folder_mut(&mut next, workspace_id, folder_id) {
                folder.files.retain(|file| file.id != file_id);
            }
        }
    }

    next
}

fn workspace_mut(state: &mut AppState, workspace_id: Uuid) -> Option<&mut WorkspaceNode> {
    state.workspaces.iter_mut().find(|workspace| workspace.row.id == workspace_id)
}

fn folder_mut(
    state: &mut AppState,
    workspace_id: Uuid,
    folder_id: Uuid,
) -> Option<&mut FolderNode> {
    workspace_mut(state, workspace_id)?
        .folders
        .iter_mut()
        .find(|folder| folder.row.id == folder_id)
}

fn sort_folders(workspace: &mut WorkspaceNode) {
    workspace.folders.sort_by_key(|folder| folder.row.created_at);
}

fn sort_files(folder: &mut FolderNode) {
    folder.files.sort_by_key(|file| file.created_at);
}
