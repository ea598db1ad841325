//! Tabset Tabs
//!
//! The live editor side of a saved session: one [`FileEntry`] per open tab,
//! and the [`TabSource`] trait a host editor implements so sessions can be
//! captured from and restored into its tab strip.

mod entry;
mod error;
mod memory;
mod source;

pub use entry::{sort_by_name, sorted_by_name, FileEntry, Selection};
pub use error::TabError;
pub use memory::MemoryTabSource;
pub use source::{LiveTabs, OpenReport, TabSource};

pub type Result<T> = std::result::Result<T, TabError>;
