//! Database migrations
//!
//! Schema: metadata, workspaces, the sessions of each workspace and the
//! ordered files of each session.

use crate::Result;
use rusqlite::{Connection, OptionalExtension};

pub const SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<i32, _> =
        conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        });

    match result {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(rusqlite::Error::SqliteFailure(_, _)) => {
            // Table doesn't exist yet
            conn.execute(
                "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
                [],
            )?;
            conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])?;
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Schema version of an existing database, without creating anything.
/// `None` when the file carries no schema bookkeeping at all.
pub fn stored_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let has_table: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(None);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1: Initial schema");

    // Format version and other opaque metadata
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    )?;

    // One registry per workspace identity
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS workspaces (
            name TEXT PRIMARY KEY,
            current_session TEXT,
            previous_session TEXT
        );
    "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            workspace TEXT NOT NULL,
            name TEXT NOT NULL,
            is_snapshot INTEGER NOT NULL DEFAULT 0,
            keep_alphabetical INTEGER NOT NULL DEFAULT 0,
            active_file TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (workspace, name),
            FOREIGN KEY (workspace) REFERENCES workspaces(name) ON DELETE CASCADE
        );
    "#,
    )?;

    // Files keep their stored order through the position column
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS session_files (
            workspace TEXT NOT NULL,
            session TEXT NOT NULL,
            position INTEGER NOT NULL,
            file_name TEXT NOT NULL,
            full_path TEXT NOT NULL,
            start_line INTEGER NOT NULL DEFAULT 0,
            end_line INTEGER NOT NULL DEFAULT 0,
            sel_offset INTEGER NOT NULL DEFAULT 0,
            sel_length INTEGER NOT NULL DEFAULT 0,
            selected_text TEXT,
            is_empty INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (workspace, session, position),
            FOREIGN KEY (workspace, session) REFERENCES sessions(workspace, name) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_session_files_session ON session_files(workspace, session);
    "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('meta', 'workspaces', 'sessions', 'session_files')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn test_stored_schema_version_does_not_create() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(stored_schema_version(&conn).unwrap(), None);

        let tables: i32 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tables, 0);

        run_migrations(&conn).unwrap();
        assert_eq!(stored_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }
}
