//! Database connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::StorageError;
use crate::migrations::{run_migrations, stored_schema_version, SCHEMA_VERSION};
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Cascading deletes from sessions to their files
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // Rollback journal keeps the store a single file on disk
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "DELETE", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an existing store for reading. Nothing is created or migrated;
    /// a file without this crate's schema is rejected.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        match stored_schema_version(&conn)? {
            Some(version) if version <= SCHEMA_VERSION => {}
            Some(version) => {
                return Err(StorageError::Schema(format!(
                    "schema version {version} is newer than {SCHEMA_VERSION}"
                )));
            }
            None => {
                return Err(StorageError::Schema("no schema version table".to_string()));
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.with_connection(|conn| put_meta(conn, key, value))
    }

    /// Numeric metadata, `None` when the key was never written.
    pub fn get_meta_u32(&self, key: &str) -> Result<Option<u32>> {
        match self.get_meta(key)? {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| StorageError::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}

/// Upsert one metadata key on an open connection or transaction.
pub fn put_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, updated_at],
    )?;
    Ok(())
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
