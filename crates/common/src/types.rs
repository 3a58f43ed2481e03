// Core domain types shared across all Arbor crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workspace is the top-level container for folders and files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: Uuid,
    pub title: String,
    /// Glyph shown next to the title, e.g. "💼".
    pub icon_id: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
    /// Opaque rich-text body blob, owned by the editor engine.
    pub data: Option<String>,
    /// Empty = active, non-empty = trash marker (e.g. "Deleted by a@b.c").
    #[serde(default)]
    pub in_trash: String,
    #[serde(default)]
    pub banner_url: String,
    pub logo: Option<String>,
}

/// A folder inside a workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub icon_id: String,
    pub created_at: DateTime<Utc>,
    pub data: Option<String>,
    #[serde(default)]
    pub in_trash: String,
    #[serde(default)]
    pub banner_url: String,
}

/// A file inside a folder. `workspace_id` is denormalized so a file row is
/// addressable without loading its folder first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct File {
    pub id: Uuid,
    pub folder_id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub icon_id: String,
    pub created_at: DateTime<Utc>,
    pub data: Option<String>,
    #[serde(default)]
    pub in_trash: String,
    #[serde(default)]
    pub banner_url: String,
}

impl Workspace {
    pub fn is_trashed(&self) -> bool {
        !self.in_trash.is_empty()
    }
}

impl Folder {
    pub fn is_trashed(&self) -> bool {
        !self.in_trash.is_empty()
    }
}

impl File {
    pub fn is_trashed(&self) -> bool {
        !self.in_trash.is_empty()
    }
}

/// Which kind of entity an id refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workspace,
    Folder,
    File,
}

/// A flat durable-store row for any entity kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    Workspace(Workspace),
    Folder(Folder),
    File(File),
}

impl Row {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Workspace(_) => EntityKind::Workspace,
            Self::Folder(_) => EntityKind::Folder,
            Self::File(_) => EntityKind::File,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Workspace(w) => w.id,
            Self::Folder(f) => f.id,
            Self::File(f) => f.id,
        }
    }
}

/// Visibility chosen when a workspace is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkspacePermissions {
    Private,
    Shared,
}

/// The authenticated local user, as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

/// Extra profile fields resolved on demand (avatar lives in blob storage,
/// not in the auth record).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub avatar_url: String,
}

/// Read-only display snapshot of any entity kind. Carries only the fields a
/// view needs, so a fallback snapshot can never masquerade as a live record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayFields {
    pub title: String,
    pub icon_id: String,
    pub created_at: DateTime<Utc>,
    pub data: Option<String>,
    pub in_trash: String,
    pub banner_url: String,
}

impl DisplayFields {
    pub fn is_trashed(&self) -> bool {
        !self.in_trash.is_empty()
    }
}

impl From<&Workspace> for DisplayFields {
    fn from(w: &Workspace) -> Self {
        Self {
            title: w.title.clone(),
            icon_id: w.icon_id.clone(),
            created_at: w.created_at,
            data: w.data.clone(),
            in_trash: w.in_trash.clone(),
            banner_url: w.banner_url.clone(),
        }
    }
}

impl From<&Folder> for DisplayFields {
    fn from(f: &Folder) -> Self {
        Self {
            title: f.title.clone(),
            icon_id: f.icon_id.clone(),
            created_at: f.created_at,
            data: f.data.clone(),
            in_trash: f.in_trash.clone(),
            banner_url: f.banner_url.clone(),
        }
    }
}

impl From<&File> for DisplayFields {
    fn from(f: &File) -> Self {
        Self {
            title: f.title.clone(),
            icon_id: f.icon_id.clone(),
            created_at: f.created_at,
            data: f.data.clone(),
            in_trash: f.in_trash.clone(),
            banner_url: f.banner_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_file() -> File {
        File {
            id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            title: "Notes".into(),
            icon_id: "📄".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            data: Some("body".into()),
            in_trash: String::new(),
            banner_url: String::new(),
        }
    }

    #[test]
    fn empty_in_trash_means_active() {
        let mut file = sample_file();
        assert!(!file.is_trashed());

        file.in_trash = "Deleted by alice@example.com".into();
        assert!(file.is_trashed());
    }

    #[test]
    fn row_reports_kind_and_id() {
        let file = sample_file();
        let row = Row::File(file.clone());
        assert_eq!(row.kind(), EntityKind::File);
        assert_eq!(row.id(), file.id);
    }

    #[test]
    fn row_serde_round_trips_with_kind_tag() {
        let row = Row::File(sample_file());
        let encoded = serde_json::to_string(&row).unwrap();
        assert!(encoded.contains("\"kind\":\"file\""));
        let decoded: Row = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, row);
    }

    #[test]
    fn display_fields_capture_only_view_data() {
        let file = sample_file();
        let display = DisplayFields::from(&file);
        assert_eq!(display.title, file.title);
        assert_eq!(display.created_at, file.created_at);
        assert!(!display.is_trashed());
    }
}
