//! Persisted session container
//!
//! One [`SessionsData`] holds the registries of every workspace and is
//! loaded and saved as a unit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::SessionError;
use crate::registry::SessionRegistry;
use crate::Result;

/// Format version of the stored container. Readers accept any minor
/// version of a major they know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion { major: 1, minor: 0 };

    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn is_supported(&self) -> bool {
        self.major <= Self::CURRENT.major
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionsData {
    #[serde(default)]
    version: FormatVersion,
    #[serde(default)]
    workspaces: BTreeMap<String, SessionRegistry>,
    /// Why the last load came back empty. Never persisted.
    #[serde(skip)]
    load_error: Option<SessionError>,
}

impl SessionsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty container standing in for a store that could not be read.
    pub fn failed(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            load_error: Some(SessionError::Load {
                path: path.to_path_buf(),
                reason: reason.into(),
            }),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        version: FormatVersion,
        workspaces: BTreeMap<String, SessionRegistry>,
    ) -> Self {
        Self {
            version,
            workspaces,
            load_error: None,
        }
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn registry(&self, workspace: &str) -> Option<&SessionRegistry> {
        self.workspaces.get(workspace)
    }

    /// Registry of `workspace`, created empty on first use.
    pub fn registry_mut(&mut self, workspace: &str) -> &mut SessionRegistry {
        self.workspaces.entry(workspace.to_string()).or_default()
    }

    pub fn remove_workspace(&mut self, workspace: &str) -> Option<SessionRegistry> {
        self.workspaces.remove(workspace)
    }

    pub fn workspace_names(&self) -> Vec<&str> {
        self.workspaces.keys().map(String::as_str).collect()
    }

    pub fn workspaces(&self) -> impl Iterator<Item = (&str, &SessionRegistry)> {
        self.workspaces.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.values().all(SessionRegistry::is_empty)
    }

    /// Hand out the deferred load error. Later calls return `None`.
    pub fn take_load_error(&mut self) -> Option<SessionError> {
        self.load_error.take()
    }

    pub fn has_load_error(&self) -> bool {
        self.load_error.is_some()
    }

    pub fn ensure_supported(&self) -> Result<()> {
        if !self.version.is_supported() {
            return Err(SessionError::UnsupportedVersion {
                major: self.version.major,
                minor: self.version.minor,
            });
        }
        Ok(())
    }

    /// Fix dangling pointers left by older or hand-edited stores.
    pub(crate) fn repair(&mut self) {
        for registry in self.workspaces.values_mut() {
            registry.repair();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionFlags;
    use tabset_tabs::{FileEntry, LiveTabs};

    #[test]
    fn test_registry_created_on_demand() {
        let mut data = SessionsData::new();
        assert!(data.registry("ws").is_none());
        assert!(data.is_empty());

        data.registry_mut("ws")
            .create(
                "Work",
                SessionFlags::default(),
                LiveTabs::new(vec![FileEntry::from_path("/a.rs")], None),
                true,
            )
            .unwrap();

        assert_eq!(data.workspace_names(), vec!["ws"]);
        assert_eq!(data.registry("ws").unwrap().len(), 1);
        assert!(!data.is_empty());

        assert!(data.remove_workspace("ws").is_some());
        assert!(data.workspace_names().is_empty());
    }

    #[test]
    fn test_failed_container_reports_once() {
        let mut data = SessionsData::failed(Path::new("/tmp/broken.json"), "bad header");
        assert!(data.has_load_error());
        assert!(data.is_empty());

        let error = data.take_load_error().unwrap();
        assert!(error.to_string().contains("bad header"));
        assert!(error.to_string().contains("/tmp/broken.json"));

        assert!(data.take_load_error().is_none());
        // still usable
        data.registry_mut("ws");
        assert_eq!(data.workspace_names(), vec!["ws"]);
    }

    #[test]
    fn test_version_support() {
        assert!(FormatVersion::new(1, 7).is_supported());
        assert!(FormatVersion::new(0, 9).is_supported());
        assert!(!FormatVersion::new(2, 0).is_supported());
        assert_eq!(FormatVersion::CURRENT.to_string(), "1.0");

        let data = SessionsData::from_parts(FormatVersion::new(3, 1), BTreeMap::new());
        assert!(matches!(
            data.ensure_supported(),
            Err(SessionError::UnsupportedVersion { major: 3, minor: 1 })
        ));
    }

    #[test]
    fn test_json_shape() {
        let mut data = SessionsData::new();
        data.registry_mut("ws")
            .create(
                "Work",
                SessionFlags::new(true, false),
                LiveTabs::new(vec![FileEntry::from_path("/p/a.rs")], None),
                true,
            )
            .unwrap();

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["version"]["major"], 1);
        assert_eq!(value["workspaces"]["ws"]["current"], "Work");
        assert!(value.get("load_error").is_none());

        let parsed: SessionsData = serde_json::from_value(value).unwrap();
        let work = parsed.registry("ws").unwrap().get("Work").unwrap();
        assert!(work.keep_alphabetical());
        assert_eq!(work.files()[0].file_name(), "a.rs");
    }
}
