//! Session error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session name cannot be blank")]
    NameBlank,

    #[error("Session name already in use: {0}")]
    NameInUse(String),

    #[error("No current session")]
    NoCurrentSession,

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("No previous session to switch back to")]
    NoPreviousSession,

    #[error("Could not load sessions from {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Unsupported session data version {major}.{minor}")]
    UnsupportedVersion { major: u32, minor: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] tabset_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
