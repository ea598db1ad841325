//! Session registry
//!
//! The sessions of one workspace, keyed by name, plus which session is bound
//! to the open tabs (`current`) and which one was bound before it
//! (`previous`). Names are unique ignoring case.
//!
//! Every operation validates first and mutates after, so a failed call
//! leaves the registry as it was. Saving is left to the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tabset_tabs::LiveTabs;

use crate::error::SessionError;
use crate::session::{Session, SessionFlags};
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRegistry {
    sessions: BTreeMap<String, Session>,
    /// Session following the open tabs, if any
    #[serde(default)]
    current: Option<String>,
    /// Session that was current before the last switch. May be stale.
    #[serde(default)]
    previous: Option<String>,
}

/// One row of a session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub name: String,
    pub keep_alphabetical: bool,
    pub is_snapshot: bool,
    pub file_count: usize,
    pub is_current: bool,
    pub is_previous: bool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        sessions: BTreeMap<String, Session>,
        current: Option<String>,
        previous: Option<String>,
    ) -> Self {
        let mut registry = Self {
            sessions,
            current,
            previous,
        };
        registry.repair();
        registry
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.sessions.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Session)> {
        self.sessions.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn get(&self, name: &str) -> Option<&Session> {
        self.sessions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn previous_name(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn set_previous(&mut self, name: Option<String>) {
        self.previous = name;
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_deref().and_then(|name| self.sessions.get(name))
    }

    pub fn current_session_mut(&mut self) -> Option<&mut Session> {
        let name = self.current.as_deref()?;
        self.sessions.get_mut(name)
    }

    /// Make `name` current, allocating an empty session the first time it is
    /// used. `None` detaches the open tabs from every session.
    pub fn switch_to(&mut self, name: Option<&str>) -> Option<&mut Session> {
        self.current = name.map(str::to_string);
        let name = name?;
        Some(self.sessions.entry(name.to_string()).or_default())
    }

    /// Drop a session. If it was current, nothing is current afterwards.
    pub fn remove(&mut self, name: &str) -> Option<Session> {
        let removed = self.sessions.remove(name)?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Some(removed)
    }

    pub fn delete_current(&mut self) -> Option<(String, Session)> {
        let name = self.current.take()?;
        let session = self.sessions.remove(&name)?;
        Some((name, session))
    }

    /// Case-insensitive name check.
    pub fn is_name_in_use(&self, name: &str) -> bool {
        self.find_name(name, None).is_some()
    }

    fn find_name(&self, name: &str, except: Option<&str>) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.sessions
            .keys()
            .map(String::as_str)
            .filter(|existing| Some(*existing) != except)
            .find(|existing| existing.to_lowercase() == wanted)
    }

    /// Feed the observed tab set to the current session. Snapshots and an
    /// empty tab set leave it alone.
    pub fn track_live(&mut self, live: LiveTabs) -> bool {
        let Some(session) = self.current_session_mut() else {
            return false;
        };

        let LiveTabs { files, active } = live;
        let applied = session.update_file_list(files);
        if applied {
            session.set_active_file(active);
        }

        tracing::debug!(
            session = ?self.current,
            applied,
            "Tracked live tabs"
        );

        applied
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|(name, session)| SessionSummary {
                name: name.clone(),
                keep_alphabetical: session.keep_alphabetical(),
                is_snapshot: session.is_snapshot(),
                file_count: session.file_count(),
                is_current: self.current.as_deref() == Some(name.as_str()),
                is_previous: self.previous.as_deref() == Some(name.as_str()),
            })
            .collect()
    }

    /// Detach a current name that no longer has a session.
    pub(crate) fn repair(&mut self) {
        if let Some(name) = self.current.as_deref() {
            if !self.sessions.contains_key(name) {
                tracing::warn!(session = %name, "Current session missing, detaching");
                self.current = None;
            }
        }
    }

    fn get_or_not_found(&self, name: &str) -> Result<&Session> {
        self.sessions
            .get(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }

    // === Operations ===

    /// Save the open tabs as a new session.
    ///
    /// With `switch_to` the new session becomes current and the old current
    /// one is remembered as previous; otherwise the new session is stored
    /// and the current one stays current.
    pub fn create(
        &mut self,
        name: &str,
        flags: SessionFlags,
        live: LiveTabs,
        switch_to: bool,
    ) -> Result<&Session> {
        let name = validate_name(name)?;
        if self.is_name_in_use(name) {
            return Err(SessionError::NameInUse(name.to_string()));
        }

        let previous_current = self.current.clone();
        let LiveTabs { files, active } = live;
        let file_count = files.len();

        if let Some(session) = self.switch_to(Some(name)) {
            session.create_session_data(flags.keep_alphabetical, flags.is_snapshot, files);
            session.set_active_file(active);
        }

        if switch_to {
            self.previous = previous_current;
        } else {
            self.current = previous_current;
        }

        tracing::info!(
            session = %name,
            files = file_count,
            keep_alphabetical = flags.keep_alphabetical,
            is_snapshot = flags.is_snapshot,
            switched = switch_to,
            "Created session"
        );

        self.get_or_not_found(name)
    }

    /// Rename and reconfigure the current session, settling its files
    /// against the open tabs. Returns whether the open tabs were adopted.
    ///
    /// The session is removed and recreated under `new_name`; a previous
    /// pointer to the old name follows the rename.
    pub fn update(
        &mut self,
        new_name: &str,
        flags: SessionFlags,
        live: LiveTabs,
        update_snapshot: bool,
    ) -> Result<bool> {
        let current_name = self
            .current
            .clone()
            .ok_or(SessionError::NoCurrentSession)?;
        let new_name = validate_name(new_name)?;
        if self.find_name(new_name, Some(current_name.as_str())).is_some() {
            return Err(SessionError::NameInUse(new_name.to_string()));
        }
        if !self.sessions.contains_key(&current_name) {
            return Err(SessionError::NotFound(current_name));
        }

        let (_, original) = self
            .delete_current()
            .ok_or_else(|| SessionError::NotFound(current_name.clone()))?;
        let original_active = original.active_file().map(str::to_string);
        let original_files = original.files().to_vec();

        let LiveTabs { files, active } = live;
        let mut adopted = false;

        if let Some(session) = self.switch_to(Some(new_name)) {
            adopted = session.update_session_data(
                flags.keep_alphabetical,
                flags.is_snapshot,
                original_files,
                files,
                update_snapshot,
            );
            session.set_active_file(if adopted { active } else { original_active });
        }

        if self.previous.as_deref() == Some(current_name.as_str()) {
            self.previous = Some(new_name.to_string());
        }

        tracing::info!(
            from = %current_name,
            to = %new_name,
            adopted_open_tabs = adopted,
            keep_alphabetical = flags.keep_alphabetical,
            is_snapshot = flags.is_snapshot,
            "Updated session"
        );

        Ok(adopted)
    }

    /// Bind an existing session to the open tabs and apply `flags` to it.
    /// The caller restores the returned session's files into the editor.
    pub fn select(&mut self, name: &str, flags: SessionFlags) -> Result<&Session> {
        if !self.sessions.contains_key(name) {
            return Err(SessionError::NotFound(name.to_string()));
        }

        self.previous = self.current.take();
        if let Some(session) = self.switch_to(Some(name)) {
            session.update_flags(flags.keep_alphabetical, flags.is_snapshot);
        }

        tracing::info!(
            session = %name,
            previous = ?self.previous,
            "Selected session"
        );

        self.get_or_not_found(name)
    }

    /// Select the previous session with its own flags.
    pub fn switch_back(&mut self) -> Result<&Session> {
        let name = self
            .previous
            .clone()
            .ok_or(SessionError::NoPreviousSession)?;
        let flags = self
            .sessions
            .get(&name)
            .map(Session::flags)
            .ok_or_else(|| SessionError::NotFound(name.clone()))?;

        self.select(&name, flags)
    }

    /// Delete `name`, or the current session when no name is given. Deleting
    /// with nothing current and no name is a no-op. Returns the deleted name.
    pub fn delete(&mut self, name: Option<&str>) -> Result<Option<String>> {
        let deleted = match name {
            None => self.delete_current().map(|(name, _)| name),
            Some(name) => {
                self.remove(name)
                    .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
                Some(name.to_string())
            }
        };

        if let Some(name) = &deleted {
            tracing::info!(session = %name, current = ?self.current, "Deleted session");
        }

        Ok(deleted)
    }
}

/// A name is kept as typed; only an all-whitespace name is refused.
fn validate_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(SessionError::NameBlank);
    }
    Ok(name)
}
