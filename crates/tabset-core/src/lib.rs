//! Tabset Core
//!
//! Coordination layer for saving and restoring editor tab sessions.
//! A [`Workspace`] ties the session registry of one workspace to the host's
//! tabs and to the store the sessions are saved in.

mod config;
mod error;
mod preview;
mod workspace;

pub use config::{Config, StoreFormat};
pub use error::{CoreError, ErrorCategory};
pub use preview::{CreatePreview, UpdatePreview, UpdateRequest};
pub use workspace::Workspace;

// Re-export core components
pub use tabset_session::{
    count_matching, FormatVersion, JsonStore, Session, SessionDiff, SessionError, SessionFlags,
    SessionRegistry, SessionStore, SessionSummary, SessionsData, SqliteStore,
};
pub use tabset_storage::{Database, StorageError};
pub use tabset_tabs::{
    FileEntry, LiveTabs, MemoryTabSource, OpenReport, Selection, TabError, TabSource,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A host may already have installed a subscriber
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
