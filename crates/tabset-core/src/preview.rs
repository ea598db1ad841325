//! What a confirmation prompt shows before a create or update commits.

use serde::{Deserialize, Serialize};

use tabset_session::{SessionDiff, SessionFlags};

/// Input for the "save open tabs as a session" prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePreview {
    /// Names of the open tabs, in tab order
    pub live_file_names: Vec<String>,
    /// Flags of the current session, offered as defaults
    pub defaults: SessionFlags,
    pub current: Option<String>,
}

/// Input for the "update current session" prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePreview {
    pub name: String,
    pub flags: SessionFlags,
    pub stored_file_names: Vec<String>,
    pub live_file_names: Vec<String>,
    pub diff: SessionDiff,
}

/// What the user confirmed in the update prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub name: String,
    pub flags: SessionFlags,
    /// Let a snapshot take the open tabs
    pub update_snapshot: bool,
}

impl UpdateRequest {
    /// Keep name and flags, refresh the file list.
    pub fn refresh(preview: &UpdatePreview) -> Self {
        Self {
            name: preview.name.clone(),
            flags: preview.flags,
            update_snapshot: true,
        }
    }
}
