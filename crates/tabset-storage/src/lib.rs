//! Tabset Storage Layer
//!
//! SQLite file holding saved editor sessions. A store file is a single
//! self-contained database so it can be copied, exported and imported as is.

mod database;
mod error;
mod migrations;

pub use database::{put_meta, Database};
pub use error::StorageError;
pub use migrations::SCHEMA_VERSION;

pub type Result<T> = std::result::Result<T, StorageError>;
