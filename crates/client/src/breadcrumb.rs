// Breadcrumb derivation.
//
// Walks the tree from the workspace down to the routed entity and renders
// "<icon> <title>" segments joined by " / ". A segment whose entity isn't
// loaded yet is simply omitted — the trail fills in as the cache does.

use arbor_common::route::DashboardRoute;

use crate::tree::AppState;

/// Display trail for the current route, or `None` when the route carries
/// no workspace.
pub fn breadcrumbs(state: &AppState, route: &DashboardRoute) -> Option<String> {
    let workspace_id = route.workspace_id?;
    let mut segments = Vec::new();

    let workspace = state.workspace(workspace_id);
    if let Some(workspace) = workspace {
        segments.push(format!("{} {}", workspace.row.icon_id, workspace.row.title));
    }

    let folder = route
        .folder_id
        .and_then(|folder_id| workspace.and_then(|workspace| workspace.folder(folder_id)));
    if let Some(folder) = folder {
        segments.push(format!("{} {}", folder.row.icon_id, folder.row.title));
    }

    let file =
        route.file_id.and_then(|file_id| folder.and_then(|folder| folder.file(file_id)));
    if let Some(file) = file {
        segments.push(format!("{} {}", file.icon_id, file.title));
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join(" / "))
    }
}
