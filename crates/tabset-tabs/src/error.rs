//! Tab error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    /// No editor window is ready to report or receive tabs.
    #[error("Editor host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Could not open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("File is not open: {0}")]
    NotOpen(String),
}

impl TabError {
    /// Host failures abort the whole operation, everything else is per file.
    pub fn is_host_failure(&self) -> bool {
        matches!(self, TabError::HostUnavailable(_))
    }
}
