//! Host tab source
//!
//! The editor that owns the real tabs implements [`TabSource`]. Everything
//! else in the workspace only sees open tabs as [`FileEntry`] values.

use crate::entry::FileEntry;
use crate::Result;

/// Outcome of opening a list of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReport {
    /// Paths that were opened, in order
    pub opened: Vec<String>,
    /// Paths that could not be opened, with the reason
    pub failed: Vec<(String, String)>,
    /// Whether the requested tab ended up focused
    pub activated: bool,
}

impl OpenReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The open tab set as observed at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveTabs {
    pub files: Vec<FileEntry>,
    pub active: Option<String>,
}

impl LiveTabs {
    pub fn new(files: Vec<FileEntry>, active: Option<String>) -> Self {
        Self { files, active }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file_name().to_string()).collect()
    }
}

pub trait TabSource {
    /// Open tabs in the host's current tab order.
    fn list_open_files(&self) -> Result<Vec<FileEntry>>;

    /// Path of the focused tab, `None` if nothing is open.
    fn active_file(&self) -> Result<Option<String>>;

    /// Open one file and restore its cursor or selection.
    fn open_file(&mut self, file: &FileEntry) -> Result<()>;

    /// Focus an already open tab.
    fn activate(&mut self, path: &str) -> Result<()>;

    fn close_all(&mut self) -> Result<()>;

    /// Open files together with the focused tab.
    fn capture(&self) -> Result<LiveTabs> {
        Ok(LiveTabs {
            files: self.list_open_files()?,
            active: self.active_file()?,
        })
    }

    /// Open every file in order, then focus `activate` if it was opened.
    ///
    /// A file that fails to open is recorded and skipped; only a host failure
    /// stops the loop.
    fn open_files(&mut self, files: &[FileEntry], activate: Option<&str>) -> Result<OpenReport> {
        let mut report = OpenReport::default();

        for file in files {
            match self.open_file(file) {
                Ok(()) => report.opened.push(file.full_path().to_string()),
                Err(e) if e.is_host_failure() => return Err(e),
                Err(e) => {
                    tracing::warn!(path = %file.full_path(), error = %e, "Skipping file");
                    report
                        .failed
                        .push((file.full_path().to_string(), e.to_string()));
                }
            }
        }

        if let Some(path) = activate {
            if report.opened.iter().any(|p| p == path) {
                match self.activate(path) {
                    Ok(()) => report.activated = true,
                    Err(e) if e.is_host_failure() => return Err(e),
                    Err(e) => tracing::warn!(path = %path, error = %e, "Could not focus tab"),
                }
            }
        }

        tracing::debug!(
            opened = report.opened.len(),
            failed = report.failed.len(),
            activated = report.activated,
            "Opened files"
        );

        Ok(report)
    }
}
