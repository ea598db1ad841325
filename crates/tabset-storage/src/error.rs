//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is a database, but not one this crate wrote.
    #[error("Unrecognized schema: {0}")]
    Schema(String),

    #[error("Invalid stored value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
