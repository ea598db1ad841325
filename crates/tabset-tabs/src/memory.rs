//! In-memory tab source
//!
//! Stands in for an editor host: keeps an ordered tab strip and a focused tab.
//! Useful for embedding without a real editor and for exercising the
//! session workflows.

use std::collections::HashSet;

use crate::entry::FileEntry;
use crate::error::TabError;
use crate::source::TabSource;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct MemoryTabSource {
    /// Open tabs, in strip order
    open: Vec<FileEntry>,
    /// Path of the focused tab
    active: Option<String>,
    /// Simulates a host with no editor window
    unavailable: bool,
    /// Paths that fail to open, e.g. deleted from disk
    unopenable: HashSet<String>,
}

impl MemoryTabSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab strip with `files` open and the last one focused.
    pub fn with_files(files: Vec<FileEntry>) -> Self {
        let active = files.last().map(|f| f.full_path().to_string());
        Self {
            open: files,
            active,
            ..Self::default()
        }
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn mark_unopenable(&mut self, path: impl Into<String>) {
        self.unopenable.insert(path.into());
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.open
    }

    pub fn open_paths(&self) -> Vec<&str> {
        self.open.iter().map(|f| f.full_path()).collect()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(TabError::HostUnavailable(
                "no active editor window".to_string(),
            ));
        }
        Ok(())
    }
}

impl TabSource for MemoryTabSource {
    fn list_open_files(&self) -> Result<Vec<FileEntry>> {
        self.ensure_available()?;
        Ok(self.open.clone())
    }

    fn active_file(&self) -> Result<Option<String>> {
        self.ensure_available()?;
        Ok(self.active.clone())
    }

    fn open_file(&mut self, file: &FileEntry) -> Result<()> {
        self.ensure_available()?;

        if self.unopenable.contains(file.full_path()) {
            return Err(TabError::OpenFailed {
                path: file.full_path().to_string(),
                reason: "file not found".to_string(),
            });
        }

        // An already open file keeps its tab and takes the new cursor
        match self.open.iter_mut().find(|f| f.same_file(file)) {
            Some(existing) => *existing = file.clone(),
            None => self.open.push(file.clone()),
        }
        self.active = Some(file.full_path().to_string());

        Ok(())
    }

    fn activate(&mut self, path: &str) -> Result<()> {
        self.ensure_available()?;

        if !self.open.iter().any(|f| f.full_path() == path) {
            return Err(TabError::NotOpen(path.to_string()));
        }
        self.active = Some(path.to_string());

        Ok(())
    }

    fn close_all(&mut self) -> Result<()> {
        self.ensure_available()?;
        self.open.clear();
        self.active = None;
        Ok(())
    }
}
