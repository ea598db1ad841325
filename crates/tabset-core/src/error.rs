//! Core error types

use serde::Serialize;
use thiserror::Error;

use tabset_session::SessionError;
use tabset_tabs::TabError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] tabset_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] TabError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// How a failure should be handled by whoever drives the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input; nothing changed
    Validation,
    /// Missing session or selection; nothing changed
    NotFound,
    /// Store could not be read or written; in-memory state is still usable
    Persistence,
    /// Editor not ready; the operation was abandoned
    HostUnavailable,
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Session(e) => match e {
                SessionError::NameBlank | SessionError::NameInUse(_) => ErrorCategory::Validation,
                SessionError::NoCurrentSession
                | SessionError::NotFound(_)
                | SessionError::NoPreviousSession => ErrorCategory::NotFound,
                SessionError::Load { .. }
                | SessionError::UnsupportedVersion { .. }
                | SessionError::Storage(_)
                | SessionError::Json(_)
                | SessionError::Io(_) => ErrorCategory::Persistence,
            },
            CoreError::Tab(e) => match e {
                TabError::HostUnavailable(_) => ErrorCategory::HostUnavailable,
                TabError::OpenFailed { .. } | TabError::NotOpen(_) => ErrorCategory::NotFound,
            },
            CoreError::Storage(_) | CoreError::Io(_) => ErrorCategory::Persistence,
            CoreError::Config(_) => ErrorCategory::Validation,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self.category(), ErrorCategory::HostUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_categories() {
        let blank: CoreError = SessionError::NameBlank.into();
        assert_eq!(blank.category(), ErrorCategory::Validation);

        let missing: CoreError = SessionError::NotFound("Work".to_string()).into();
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        let load: CoreError = SessionError::Load {
            path: PathBuf::from("/tmp/s.db"),
            reason: "truncated".to_string(),
        }
        .into();
        assert_eq!(load.category(), ErrorCategory::Persistence);

        let host: CoreError = TabError::HostUnavailable("no window".to_string()).into();
        assert_eq!(host.category(), ErrorCategory::HostUnavailable);
        assert!(!host.is_recoverable());
        assert!(blank.is_recoverable());
    }

    #[test]
    fn test_messages_name_the_session() {
        let err: CoreError = SessionError::NameInUse("Work".to_string()).into();
        assert_eq!(err.to_string(), "Session error: Session name already in use: Work");
    }
}
