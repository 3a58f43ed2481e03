// In-memory normalized tree cache.
//
// `AppState` holds every entity the current user has loaded, nested the way
// the UI renders it: workspaces own folders, folders own files. The state
// is only ever replaced through `TreeStore::dispatch`, which runs the pure
// reducer — consumers get `&AppState` and nothing else.

pub mod reducer;
pub mod resolve;

use arbor_common::types::{File, Folder, Workspace};
use tracing::debug;
use uuid::Uuid;

pub use reducer::{reduce, TreeAction};
pub use resolve::{resolve_file, resolve_folder, resolve_workspace, Resolved, ViewScope};

/// A workspace together with its loaded folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNode {
    pub row: Workspace,
    pub folders: Vec<FolderNode>,
}

impl WorkspaceNode {
    pub fn new(row: Workspace) -> Self {
        Self { row, folders: Vec::new() }
    }

    pub fn folder(&self, folder_id: Uuid) -> Option<&FolderNode> {
        self.folders.iter().find(|folder| folder.row.id == folder_id)
    }
}

/// A folder together with its loaded files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub row: Folder,
    pub files: Vec<File>,
}

impl FolderNode {
    pub fn new(row: Folder) -> Self {
        Self { row, files: Vec::new() }
    }

    pub fn file(&self, file_id: Uuid) -> Option<&File> {
        self.files.iter().find(|file| file.id == file_id)
    }
}

/// Everything the current user has loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub workspaces: Vec<WorkspaceNode>,
}

impl AppState {
    pub fn workspace(&self, workspace_id: Uuid) -> Option<&WorkspaceNode> {
        self.workspaces.iter().find(|workspace| workspace.row.id == workspace_id)
    }
}

/// The single shared state container. Hand it out by reference; mutate it
/// only through `dispatch`.
#[derive(Debug, Default)]
pub struct TreeStore {
    state: AppState,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply one action through the reducer, replacing the state.
    pub fn dispatch(&mut self, action: TreeAction) {
        debug!(action = action.name(), "tree store dispatch");
        self.state = reduce(&self.state, action);
    }
}
