//! SQLite session store
//!
//! Keeps the container in a single database file: one row per workspace,
//! per session and per saved tab. A save writes a fresh file in one
//! transaction and renames it over the old one, so readers see either the
//! old container or the new one. Loading never writes.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tabset_storage::{put_meta, Database};
use tabset_tabs::{FileEntry, Selection};

use crate::data::{FormatVersion, SessionsData};
use crate::error::SessionError;
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionFlags};
use crate::store::SessionStore;
use crate::Result;

const VERSION_MAJOR_KEY: &str = "version_major";
const VERSION_MINOR_KEY: &str = "version_minor";

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStore;

impl SqliteStore {
    pub fn new() -> Self {
        Self
    }
}

impl SessionStore for SqliteStore {
    fn try_load(&self, path: &Path) -> Result<SessionsData> {
        let db = Database::open_read_only(path)?;

        let Some(major) = db.get_meta_u32(VERSION_MAJOR_KEY)? else {
            return Err(SessionError::Load {
                path: path.to_path_buf(),
                reason: "no session format version".to_string(),
            });
        };
        let minor = db.get_meta_u32(VERSION_MINOR_KEY)?.unwrap_or(0);
        let version = FormatVersion::new(major, minor);

        let workspaces = db.with_connection(read_workspaces)?;

        Ok(SessionsData::from_parts(version, workspaces))
    }

    /// Build the database next to `path` and rename it into place, so an
    /// unreadable file at `path` is replaced rather than written into.
    fn save(&self, data: &SessionsData, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = temp_path(path);
        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
        }

        let session_count = match write_database(data, &temp_path) {
            Ok(count) => count,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(
            path = %path.display(),
            sessions = session_count,
            "Saved sessions to database"
        );

        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("sessions.db"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the whole container into a fresh database file. The connection is
/// closed when this returns.
fn write_database(data: &SessionsData, path: &Path) -> Result<usize> {
    let db = Database::open(path)?;
    let mut session_count = 0usize;

    db.transaction(|conn| {
        let version = FormatVersion::CURRENT;
        put_meta(conn, VERSION_MAJOR_KEY, &version.major.to_string())?;
        put_meta(conn, VERSION_MINOR_KEY, &version.minor.to_string())?;

        for (workspace, registry) in data.workspaces() {
            write_registry(conn, workspace, registry)?;
            session_count += registry.len();
        }
        Ok(())
    })?;

    Ok(session_count)
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn read_workspaces(conn: &Connection) -> tabset_storage::Result<BTreeMap<String, SessionRegistry>> {
    let mut stmt = conn.prepare(
        "SELECT name, current_session, previous_session FROM workspaces ORDER BY name",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut workspaces = BTreeMap::new();
    for (name, current, previous) in rows {
        let sessions = read_sessions(conn, &name)?;
        workspaces.insert(name, SessionRegistry::from_parts(sessions, current, previous));
    }

    Ok(workspaces)
}

fn read_sessions(
    conn: &Connection,
    workspace: &str,
) -> tabset_storage::Result<BTreeMap<String, Session>> {
    let mut stmt = conn.prepare(
        "SELECT name, is_snapshot, keep_alphabetical, active_file, created_at, updated_at
         FROM sessions WHERE workspace = ?1",
    )?;

    let rows = stmt
        .query_map([workspace], |row| {
            let created_str: String = row.get(4)?;
            let updated_str: String = row.get(5)?;

            Ok((
                row.get::<_, String>(0)?,
                SessionFlags::new(row.get(2)?, row.get(1)?),
                row.get::<_, Option<String>>(3)?,
                parse_timestamp(&created_str),
                parse_timestamp(&updated_str),
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut sessions = BTreeMap::new();
    for (name, flags, active_file, created_at, updated_at) in rows {
        let files = read_files(conn, workspace, &name)?;
        sessions.insert(
            name,
            Session::from_parts(flags, files, active_file, created_at, updated_at),
        );
    }

    Ok(sessions)
}

fn read_files(
    conn: &Connection,
    workspace: &str,
    session: &str,
) -> tabset_storage::Result<Vec<FileEntry>> {
    let mut stmt = conn.prepare(
        "SELECT file_name, full_path, start_line, end_line, sel_offset, sel_length,
                selected_text, is_empty
         FROM session_files WHERE workspace = ?1 AND session = ?2
         ORDER BY position",
    )?;

    let files = stmt
        .query_map([workspace, session], |row| {
            let selection = Selection {
                start_line: row.get(2)?,
                end_line: row.get(3)?,
                offset: row.get(4)?,
                length: row.get(5)?,
                text: row.get(6)?,
                is_empty: row.get(7)?,
            };
            Ok(FileEntry::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)
                .with_selection(selection))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(files)
}

fn write_registry(
    conn: &Connection,
    workspace: &str,
    registry: &SessionRegistry,
) -> tabset_storage::Result<()> {
    conn.execute(
        "INSERT INTO workspaces (name, current_session, previous_session) VALUES (?1, ?2, ?3)",
        rusqlite::params![workspace, registry.current_name(), registry.previous_name()],
    )?;

    for (name, session) in registry.iter() {
        conn.execute(
            "INSERT INTO sessions
             (workspace, name, is_snapshot, keep_alphabetical, active_file, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                workspace,
                name,
                session.is_snapshot(),
                session.keep_alphabetical(),
                session.active_file(),
                session.created_at().to_rfc3339(),
                session.updated_at().to_rfc3339(),
            ],
        )?;

        for (position, file) in session.files().iter().enumerate() {
            let selection = file.selection();
            conn.execute(
                "INSERT INTO session_files
                 (workspace, session, position, file_name, full_path, start_line, end_line,
                  sel_offset, sel_length, selected_text, is_empty)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    workspace,
                    name,
                    position as i64,
                    file.file_name(),
                    file.full_path(),
                    selection.start_line,
                    selection.end_line,
                    selection.offset,
                    selection.length,
                    selection.text,
                    selection.is_empty,
                ],
            )?;
        }
    }

    Ok(())
}
