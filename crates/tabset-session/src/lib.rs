//! Tabset Session Management
//!
//! - A session is a named set of editor files with alphabetical and
//!   snapshot flags
//! - Each workspace has a registry of sessions with a current and a
//!   previous selection
//! - All workspaces share one persisted container, loaded and saved whole
//! - Loading never fails; a broken store yields an empty container that
//!   carries the error until someone asks for it

mod data;
mod error;
mod json_store;
mod registry;
mod session;
mod sqlite_store;
mod store;

pub use data::{FormatVersion, SessionsData};
pub use error::SessionError;
pub use json_store::JsonStore;
pub use registry::{SessionRegistry, SessionSummary};
pub use session::{count_matching, Session, SessionDiff, SessionFlags};
pub use sqlite_store::SqliteStore;
pub use store::SessionStore;

pub type Result<T> = std::result::Result<T, SessionError>;
