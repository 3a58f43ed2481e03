// Display reconciliation: tree cache first, caller-supplied snapshot second.
//
// A view rendering an entity may hold a server-fetched row from before the
// tree cache caught up. `resolve_*` walks the cache scoped by the current
// view's workspace/folder ids; a hit borrows the live record (so later
// dispatches show immediately), a miss yields a read-only `Fallback`
// snapshot. The two arms are distinct types, so stale fallback data cannot
// be mistaken for live state and written back.

use arbor_common::route::DashboardRoute;
use arbor_common::types::{DisplayFields, File, Folder, Workspace};
use uuid::Uuid;

use super::AppState;

/// The workspace/folder context the current view is scoped to, usually
/// taken straight from the route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewScope {
    pub workspace_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
}

impl ViewScope {
    pub fn from_route(route: &DashboardRoute) -> Self {
        Self { workspace_id: route.workspace_id, folder_id: route.folder_id }
    }
}

/// Result of a two-tier lookup: a live borrow of the cache, or a read-only
/// snapshot built from fallback display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    Live(&'a T),
    Fallback(DisplayFields),
}

impl<'a, T> Resolved<'a, T>
where
    DisplayFields: for<'r> From<&'r T>,
{
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// The live record, when there is one. Fallbacks are display-only.
    pub fn live(&self) -> Option<&'a T> {
        match self {
            Self::Live(record) => Some(record),
            Self::Fallback(_) => None,
        }
    }

    /// Display fields for rendering, whichever arm we're on.
    pub fn display(&self) -> DisplayFields {
        match self {
            Self::Live(record) => DisplayFields::from(*record),
            Self::Fallback(snapshot) => snapshot.clone(),
        }
    }
}

pub fn resolve_workspace<'a>(
    state: &'a AppState,
    workspace_id: Uuid,
    fallback: &DisplayFields,
) -> Resolved<'a, Workspace> {
    match state.workspace(workspace_id) {
        Some(node) => Resolved::Live(&node.row),
        None => Resolved::Fallback(fallback.clone()),
    }
}

pub fn resolve_folder<'a>(
    state: &'a AppState,
    scope: &ViewScope,
    folder_id: Uuid,
    fallback: &DisplayFields,
) -> Resolved<'a, Folder> {
    let live = scope
        .workspace_id
        .and_then(|workspace_id| state.workspace(workspace_id))
        .and_then(|workspace| workspace.folder(folder_id));

    match live {
        Some(node) => Resolved::Live(&node.row),
        None => Resolved::Fallback(fallback.clone()),
    }
}

pub fn resolve_file<'a>(
    state: &'a AppState,
    scope: &ViewScope,
    file_id: Uuid,
    fallback: &DisplayFields,
) -> Resolved<'a, File> {
    let live = scope
        .workspace_id
        .and_then(|workspace_id| state.workspace(workspace_id))
        .and_then(|workspace| workspace.folder(scope.folder_id?))
        .and_then(|folder| folder.file(file_id));

    match live {
        Some(file) => Resolved::Live(file),
        None => Resolved::Fallback(fallback.clone()),
    }
}

#[cfg(test)]
mod tests {
    use arbor_common::patch::FilePatch;
    use chrono::Utc;

    use crate::tree::{reduce, FolderNode, TreeAction, WorkspaceNode};

    use super::*;

    fn seeded_state() -> (AppState, Uuid, Uuid, Uuid) {
        let workspace_id = Uuid::new_v4();
        let folder_id = Uuid::new_v4();
        let file_id = Uuid::new_v4();

        let workspace = WorkspaceNode::new(Workspace {
            id: workspace_id,
            title: "Acme".into(),
            icon_id: "💼".into(),
            created_at: Utc::now(),
            owner_id: Uuid::new_v4(),
            data: None,
            in_trash: String::new(),
            banner_url: String::new(),
            logo: None,
        });
        let folder = FolderNode::new(Folder {
            id: folder_id,
            workspace_id,
            title: "Docs".into(),
            icon_id: "📁".into(),
            created_at: Utc::now(),
            data: None,
            in_trash: String::new(),
            banner_url: String::new(),
        });
        let file = File {
            id: file_id,
            folder_id,
            workspace_id,
            title: "Todo".into(),
            icon_id: "📄".into(),
            created_at: Utc::now(),
            data: Some("body".into()),
            in_trash: String::new(),
            banner_url: String::new(),
        };

        let state = AppState::default();
        let state = reduce(&state, TreeAction::AddWorkspace { workspace });
        let state = reduce(&state, TreeAction::AddFolder { workspace_id, folder });
        let state = reduce(&state, TreeAction::AddFile { workspace_id, folder_id, file });
        (state, workspace_id, folder_id, file_id)
    }

    fn server_fallback() -> DisplayFields {
        DisplayFields {
            title: "Server copy".into(),
            icon_id: "📄".into(),
            created_at: Utc::now(),
            data: Some("server body".into()),
            in_trash: String::new(),
            banner_url: String::new(),
        }
    }

    #[test]
    fn loaded_file_resolves_live() {
        let (state, ws, folder, file) = seeded_state();
        let scope = ViewScope { workspace_id: Some(ws), folder_id: Some(folder) };

        let resolved = resolve_file(&state, &scope, file, &server_fallback());
        assert!(resolved.is_live());
        assert_eq!(resolved.display().title, "Todo");
        assert_eq!(resolved.live().unwrap().id, file);
    }

    #[test]
    fn unloaded_file_falls_back_to_snapshot() {
        let (state, ws, folder, _) = seeded_state();
        let scope = ViewScope { workspace_id: Some(ws), folder_id: Some(folder) };

        let resolved = resolve_file(&state, &scope, Uuid::new_v4(), &server_fallback());
        assert!(!resolved.is_live());
        assert!(resolved.live().is_none());
        assert_eq!(resolved.display().title, "Server copy");
    }

    #[test]
    fn file_outside_scope_falls_back() {
        let (state, ws, _, file) = seeded_state();

        // Right file id, but the view is scoped to a different folder.
        let scope = ViewScope { workspace_id: Some(ws), folder_id: Some(Uuid::new_v4()) };
        let resolved = resolve_file(&state, &scope, file, &server_fallback());
        assert!(!resolved.is_live());

        // No folder context at all.
        let scope = ViewScope { workspace_id: Some(ws), folder_id: None };
        assert!(!resolve_file(&state, &scope, file, &server_fallback()).is_live());
    }

    #[test]
    fn live_resolution_tracks_store_mutations() {
        let (state, ws, folder, file) = seeded_state();
        let scope = ViewScope { workspace_id: Some(ws), folder_id: Some(folder) };

        let state = reduce(
            &state,
            TreeAction::UpdateFile {
                workspace_id: ws,
                folder_id: folder,
                file_id: file,
                patch: FilePatch { data: Some("edited".into()), ..Default::default() },
            },
        );

        let resolved = resolve_file(&state, &scope, file, &server_fallback());
        assert_eq!(resolved.display().data.as_deref(), Some("edited"));
    }

    #[test]
    fn workspace_and_folder_resolve_like_files() {
        let (state, ws, folder, _) = seeded_state();
        let scope = ViewScope { workspace_id: Some(ws), folder_id: None };

        assert!(resolve_workspace(&state, ws, &server_fallback()).is_live());
        assert!(!resolve_workspace(&state, Uuid::new_v4(), &server_fallback()).is_live());

        assert!(resolve_folder(&state, &scope, folder, &server_fallback()).is_live());
        let empty_scope = ViewScope::default();
        assert!(!resolve_folder(&state, &empty_scope, folder, &server_fallback()).is_live());
    }
}
