// Field-level partial updates.
//
// A patch names the fields it changes and nothing else. Applying a patch
// overwrites exactly those fields on the target record (last-write-wins,
// no timestamp comparison); merging two patches lets the newer one win
// field by field.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{EntityKind, File, Folder, Workspace};

/// Partial update for a workspace record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspacePatch {
    pub title: Option<String>,
    pub icon_id: Option<String>,
    pub data: Option<String>,
    pub in_trash: Option<String>,
    pub banner_url: Option<String>,
    pub logo: Option<String>,
}

/// Partial update for a folder record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FolderPatch {
    pub title: Option<String>,
    pub icon_id: Option<String>,
    pub data: Option<String>,
    pub in_trash: Option<String>,
    pub banner_url: Option<String>,
}

/// Partial update for a file record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilePatch {
    pub title: Option<String>,
    pub icon_id: Option<String>,
    pub data: Option<String>,
    pub in_trash: Option<String>,
    pub banner_url: Option<String>,
}

macro_rules! merge_field {
    ($dst:expr, $src:expr, $($field:ident),+) => {
        $(if let Some(value) = $src.$field {
            $dst.$field = Some(value);
        })+
    };
}

macro_rules! apply_field {
    ($patch:expr, $row:expr, $($field:ident),+) => {
        $(if let Some(value) = &$patch.$field {
            $row.$field = value.clone();
        })+
    };
}

impl WorkspacePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.icon_id.is_none()
            && self.data.is_none()
            && self.in_trash.is_none()
            && self.banner_url.is_none()
            && self.logo.is_none()
    }

    /// Overlay `newer` onto this patch; fields set in `newer` win.
    pub fn merge(&mut self, newer: Self) {
        merge_field!(self, newer, title, icon_id, data, in_trash, banner_url, logo);
    }

    pub fn apply_to(&self, workspace: &mut Workspace) {
        apply_field!(self, workspace, title, icon_id, in_trash, banner_url);
        if let Some(data) = &self.data {
            workspace.data = Some(data.clone());
        }
        if let Some(logo) = &self.logo {
            workspace.logo = Some(logo.clone());
        }
    }
}

impl FolderPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.icon_id.is_none()
            && self.data.is_none()
            && self.in_trash.is_none()
            && self.banner_url.is_none()
    }

    pub fn merge(&mut self, newer: Self) {
        merge_field!(self, newer, title, icon_id, data, in_trash, banner_url);
    }

    pub fn apply_to(&self, folder: &mut Folder) {
        apply_field!(self, folder, title, icon_id, in_trash, banner_url);
        if let Some(data) = &self.data {
            folder.data = Some(data.clone());
        }
    }
}

impl FilePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.icon_id.is_none()
            && self.data.is_none()
            && self.in_trash.is_none()
            && self.banner_url.is_none()
    }

    pub fn merge(&mut self, newer: Self) {
        merge_field!(self, newer, title, icon_id, data, in_trash, banner_url);
    }

    pub fn apply_to(&self, file: &mut File) {
        apply_field!(self, file, title, icon_id, in_trash, banner_url);
        if let Some(data) = &self.data {
            file.data = Some(data.clone());
        }
    }
}

/// A patch tagged with the entity kind it applies to, as handed to the
/// durable store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityPatch {
    Workspace(WorkspacePatch),
    Folder(FolderPatch),
    File(FilePatch),
}

impl EntityPatch {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Workspace(_) => EntityKind::Workspace,
            Self::Folder(_) => EntityKind::Folder,
            Self::File(_) => EntityKind::File,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Workspace(p) => p.is_empty(),
            Self::Folder(p) => p.is_empty(),
            Self::File(p) => p.is_empty(),
        }
    }

    /// Overlay `newer` onto this patch. Patches for the same entity always
    /// share a kind; on a kind mismatch the newer patch replaces the older
    /// one wholesale (last write wins, same as any other field race).
    pub fn merge(&mut self, newer: Self) {
        match (self, newer) {
            (Self::Workspace(dst), Self::Workspace(src)) => dst.merge(src),
            (Self::Folder(dst), Self::Folder(src)) => dst.merge(src),
            (Self::File(dst), Self::File(src)) => dst.merge(src),
            (dst, src) => *dst = src,
        }
    }
}

/// Identifies one entity for scheduling and adapter calls.
pub type EntityKey = (EntityKind, Uuid);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_file() -> File {
        File {
            id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            title: "Original".into(),
            icon_id: "📄".into(),
            created_at: Utc::now(),
            data: None,
            in_trash: String::new(),
            banner_url: String::new(),
        }
    }

    #[test]
    fn apply_overwrites_only_named_fields() {
        let mut file = sample_file();
        let patch = FilePatch { data: Some("Hello".into()), ..Default::default() };
        patch.apply_to(&mut file);

        assert_eq!(file.data.as_deref(), Some("Hello"));
        assert_eq!(file.title, "Original");
        assert!(file.in_trash.is_empty());
    }

    #[test]
    fn merge_lets_newer_fields_win() {
        let mut first = FilePatch { data: Some("one".into()), title: Some("T".into()), ..Default::default() };
        let second = FilePatch { data: Some("two".into()), ..Default::default() };
        first.merge(second);

        assert_eq!(first.data.as_deref(), Some("two"));
        assert_eq!(first.title.as_deref(), Some("T"));
    }

    #[test]
    fn empty_patch_is_reported_empty() {
        assert!(FilePatch::default().is_empty());
        assert!(!FilePatch { title: Some("x".into()), ..Default::default() }.is_empty());
        assert!(EntityPatch::Folder(FolderPatch::default()).is_empty());
    }

    #[test]
    fn entity_patch_merges_matching_kinds() {
        let mut patch = EntityPatch::File(FilePatch { data: Some("a".into()), ..Default::default() });
        patch.merge(EntityPatch::File(FilePatch { data: Some("b".into()), ..Default::default() }));

        match patch {
            EntityPatch::File(p) => assert_eq!(p.data.as_deref(), Some("b")),
            other => panic!("expected file patch, got {other:?}"),
        }
    }

    #[test]
    fn clearing_in_trash_uses_empty_string() {
        let mut file = sample_file();
        file.in_trash = "Deleted by a@b.c".into();

        let patch = FilePatch { in_trash: Some(String::new()), ..Default::default() };
        patch.apply_to(&mut file);
        assert!(!file.is_trashed());
    }
}
