// Dashboard route paths.
//
// Views live at `/dashboard/<workspace>/<folder>/<file>`, each segment a
// UUID and each deeper segment optional. Hard-delete flows hand one of
// these back so the caller knows where to navigate once the current view's
// entity is gone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const DASHBOARD_SEGMENT: &str = "dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route does not start with /{DASHBOARD_SEGMENT}: `{0}`")]
    NotDashboard(String),
    #[error("route segment is not a UUID: `{0}`")]
    InvalidSegment(String),
    #[error("route has more than three id segments: `{0}`")]
    TooDeep(String),
}

/// A parsed dashboard location. `folder_id` requires `workspace_id`,
/// `file_id` requires both — the parser can't produce anything else.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardRoute {
    pub workspace_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
    pub file_id: Option<Uuid>,
}

impl DashboardRoute {
    /// The dashboard root, shown after e.g. deleting a whole workspace.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn workspace(workspace_id: Uuid) -> Self {
        Self { workspace_id: Some(workspace_id), ..Self::default() }
    }

    pub fn folder(workspace_id: Uuid, folder_id: Uuid) -> Self {
        Self { workspace_id: Some(workspace_id), folder_id: Some(folder_id), file_id: None }
    }

    pub fn file(workspace_id: Uuid, folder_id: Uuid, file_id: Uuid) -> Self {
        Self {
            workspace_id: Some(workspace_id),
            folder_id: Some(folder_id),
            file_id: Some(file_id),
        }
    }

    /// Parse a path like `/dashboard/<ws>/<folder>/<file>`. Empty segments
    /// are ignored, so trailing slashes are harmless.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match segments.next() {
            Some(DASHBOARD_SEGMENT) => {}
            _ => return Err(RouteError::NotDashboard(path.to_string())),
        }

        let ids = segments
            .map(|segment| {
                Uuid::from_str(segment)
                    .map_err(|_| RouteError::InvalidSegment(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match ids.as_slice() {
            [] => Ok(Self::root()),
            [ws] => Ok(Self::workspace(*ws)),
            [ws, folder] => Ok(Self::folder(*ws, *folder)),
            [ws, folder, file] => Ok(Self::file(*ws, *folder, *file)),
            _ => Err(RouteError::TooDeep(path.to_string())),
        }
    }
}

impl fmt::Display for DashboardRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{DASHBOARD_SEGMENT}")?;
        for id in [self.workspace_id, self.folder_id, self.file_id].into_iter().flatten() {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_depth() {
        let ws = Uuid::new_v4();
        let folder = Uuid::new_v4();
        let file = Uuid::new_v4();

        assert_eq!(DashboardRoute::parse("/dashboard").unwrap(), DashboardRoute::root());
        assert_eq!(
            DashboardRoute::parse(&format!("/dashboard/{ws}")).unwrap(),
            DashboardRoute::workspace(ws)
        );
        assert_eq!(
            DashboardRoute::parse(&format!("/dashboard/{ws}/{folder}")).unwrap(),
            DashboardRoute::folder(ws, folder)
        );
        assert_eq!(
            DashboardRoute::parse(&format!("/dashboard/{ws}/{folder}/{file}")).unwrap(),
            DashboardRoute::file(ws, folder, file)
        );
    }

    #[test]
    fn ignores_trailing_slash() {
        let ws = Uuid::new_v4();
        let route = DashboardRoute::parse(&format!("/dashboard/{ws}/")).unwrap();
        assert_eq!(route, DashboardRoute::workspace(ws));
    }

    #[test]
    fn rejects_foreign_prefix_and_bad_segments() {
        assert!(matches!(
            DashboardRoute::parse("/settings/abc"),
            Err(RouteError::NotDashboard(_))
        ));
        assert!(matches!(
            DashboardRoute::parse("/dashboard/not-a-uuid"),
            Err(RouteError::InvalidSegment(_))
        ));

        let ids: Vec<String> = (0..4).map(|_| Uuid::new_v4().to_string()).collect();
        let deep = format!("/dashboard/{}", ids.join("/"));
        assert!(matches!(DashboardRoute::parse(&deep), Err(RouteError::TooDeep(_))));
    }

    #[test]
    fn display_round_trips() {
        let route = DashboardRoute::file(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let parsed = DashboardRoute::parse(&route.to_string()).unwrap();
        assert_eq!(parsed, route);
    }
}
