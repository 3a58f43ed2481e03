// Property checks over the tree reducer: ordering holds after every single
// action, and updates aimed at ids the tree doesn't know are structural
// no-ops.

use arbor_common::patch::{FilePatch, FolderPatch};
use arbor_common::types::{File, Folder, Workspace};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use arbor_client::tree::{reduce, AppState, FolderNode, TreeAction, WorkspaceNode};

#[derive(Debug, Clone)]
enum Op {
    AddFolder { ws_idx: usize, offset_secs: i64 },
    AddFile { ws_idx: usize, folder_idx: usize, offset_secs: i64 },
    UpdateUnknownFolder { ws_idx: usize },
    UpdateUnknownFile { ws_idx: usize, folder_idx: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, -86_400i64..86_400)
            .prop_map(|(ws_idx, offset_secs)| Op::AddFolder { ws_idx, offset_secs }),
        (0..4usize, 0..8usize, -86_400i64..86_400).prop_map(
            |(ws_idx, folder_idx, offset_secs)| Op::AddFile { ws_idx, folder_idx, offset_secs }
        ),
        (0..4usize).prop_map(|ws_idx| Op::UpdateUnknownFolder { ws_idx }),
        (0..4usize, 0..8usize)
            .prop_map(|(ws_idx, folder_idx)| Op::UpdateUnknownFile { ws_idx, folder_idx }),
    ]
}

fn base_time(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).single().expect("valid timestamp")
}

fn seed_state() -> AppState {
    let mut state = AppState::default();
    for title in ["One", "Two"] {
        state = reduce(
            &state,
            TreeAction::AddWorkspace {
                workspace: WorkspaceNode::new(Workspace {
                    id: Uuid::new_v4(),
                    title: title.into(),
                    icon_id: "💼".into(),
                    created_at: base_time(0),
                    owner_id: Uuid::new_v4(),
                    data: None,
                    in_trash: String::new(),
                    banner_url: String::new(),
                    logo: None,
                }),
            },
        );
    }
    state
}

fn folder_row(workspace_id: Uuid, created_at: DateTime<Utc>) -> Folder {
    Folder {
        id: Uuid::new_v4(),
        workspace_id,
        title: "folder".into(),
        icon_id: "📁".into(),
        created_at,
        data: None,
        in_trash: String::new(),
        banner_url: String::new(),
    }
}

fn file_row(workspace_id: Uuid, folder_id: Uuid, created_at: DateTime<Utc>) -> File {
    File {
        id: Uuid::new_v4(),
        folder_id,
        workspace_id,
        title: "file".into(),
        icon_id: "📄".into(),
        created_at,
        data: None,
        in_trash: String::new(),
        banner_url: String::new(),
    }
}

fn apply(state: AppState, op: Op) -> (AppState, bool) {
    match op {
        Op::AddFolder { ws_idx, offset_secs } => {
            let workspace_id = state.workspaces[ws_idx % state.workspaces.len()].row.id;
            let folder = FolderNode::new(folder_row(workspace_id, base_time(offset_secs)));
            (reduce(&state, TreeAction::AddFolder { workspace_id, folder }), false)
        }
        Op::AddFile { ws_idx, folder_idx, offset_secs } => {
            let workspace = &state.workspaces[ws_idx % state.workspaces.len()];
            let workspace_id = workspace.row.id;
            // No folders yet: aim at an unknown folder, which must no-op.
            let folder_id = if workspace.folders.is_empty() {
                Uuid::new_v4()
            } else {
                workspace.folders[folder_idx % workspace.folders.len()].row.id
            };
            let file = file_row(workspace_id, folder_id, base_time(offset_secs));
            let noop = workspace.folders.is_empty();
            (reduce(&state, TreeAction::AddFile { workspace_id, folder_id, file }), noop)
        }
        Op::UpdateUnknownFolder { ws_idx } => {
            let workspace_id = state.workspaces[ws_idx % state.workspaces.len()].row.id;
            let action = TreeAction::UpdateFolder {
                workspace_id,
                folder_id: Uuid::new_v4(),
                patch: FolderPatch { title: Some("ghost".into()), ..Default::default() },
            };
            (reduce(&state, action), true)
        }
        Op::UpdateUnknownFile { ws_idx, folder_idx } => {
            let workspace = &state.workspaces[ws_idx % state.workspaces.len()];
            let workspace_id = workspace.row.id;
            let folder_id = if workspace.folders.is_empty() {
                Uuid::new_v4()
            } else {
                workspace.folders[folder_idx % workspace.folders.len()].row.id
            };
            let action = TreeAction::UpdateFile {
                workspace_id,
                folder_id,
                file_id: Uuid::new_v4(),
                patch: FilePatch { data: Some("ghost".into()), ..Default::default() },
            };
            (reduce(&state, action), true)
        }
    }
}

fn is_sorted(state: &AppState) -> bool {
    state.workspaces.iter().all(|workspace| {
        let folders_ok = workspace
            .folders
            .windows(2)
            .all(|pair| pair[0].row.created_at <= pair[1].row.created_at);
        let files_ok = workspace.folders.iter().all(|folder| {
            folder.files.windows(2).all(|pair| pair[0].created_at <= pair[1].created_at)
        });
        folders_ok && files_ok
    })
}

proptest! {
    #[test]
    fn ordering_holds_after_every_action(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut state = seed_state();
        for op in ops {
            let before = state.clone();
            let (next, expect_noop) = apply(state, op);
            prop_assert!(is_sorted(&next), "tree lost created_at ordering");
            if expect_noop {
                prop_assert_eq!(&next, &before, "mismatched-id action changed the tree");
            }
            state = next;
        }
    }
}
