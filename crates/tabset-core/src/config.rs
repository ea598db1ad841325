//! Workspace configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use tabset_session::{JsonStore, SessionStore, SqliteStore};

use crate::error::CoreError;
use crate::Result;

/// On-disk format of the primary session store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Sqlite,
    Json,
}

impl StoreFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreFormat::Sqlite => "sessions.db",
            StoreFormat::Json => "sessions.json",
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        match self {
            StoreFormat::Sqlite => Arc::new(SqliteStore::new()),
            StoreFormat::Json => Arc::new(JsonStore::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Primary store file; only export writes anywhere else
    pub data_path: PathBuf,
    /// Identity of the workspace whose sessions this instance manages
    pub workspace: String,
    #[serde(default)]
    pub format: StoreFormat,
}

impl Config {
    pub fn new(data_dir: PathBuf, workspace: impl Into<String>) -> Self {
        let format = StoreFormat::default();

        Self {
            data_path: data_dir.join(format.file_name()),
            workspace: workspace.into(),
            format,
        }
    }

    /// Switch format, renaming the store file to match.
    pub fn with_format(mut self, format: StoreFormat) -> Self {
        self.data_path = match self.data_path.parent() {
            Some(dir) => dir.join(format.file_name()),
            None => PathBuf::from(format.file_name()),
        };
        self.format = format;
        self
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Tabset"))
            .unwrap_or_else(|| PathBuf::from(".tabset"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.workspace.trim().is_empty() {
            return Err(CoreError::Config("workspace name cannot be blank".to_string()));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(CoreError::Config("data path cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir(), "default")
    }
}

// Per-platform application data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_sqlite_file() {
        let config = Config::new(PathBuf::from("/data"), "/projects/app");
        assert_eq!(config.data_path, PathBuf::from("/data/sessions.db"));
        assert_eq!(config.format, StoreFormat::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_format_renames_file() {
        let config = Config::new(PathBuf::from("/data"), "ws").with_format(StoreFormat::Json);
        assert_eq!(config.data_path, PathBuf::from("/data/sessions.json"));
        assert_eq!(config.format, StoreFormat::Json);
    }

    #[test]
    fn test_validate_rejects_blank_workspace() {
        let config = Config::new(PathBuf::from("/data"), "  ");
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_default_workspace() {
        let config = Config::default();
        assert_eq!(config.workspace, "default");
        assert!(config.data_path.ends_with("sessions.db"));
    }

    #[test]
    fn test_deserialize_without_format() {
        let config: Config =
            serde_json::from_str(r#"{"data_path":"/d/s.db","workspace":"ws"}"#).unwrap();
        assert_eq!(config.format, StoreFormat::Sqlite);
    }
}
