//! Workspace session controller
//!
//! Owns the session container of one workspace, the host's tabs and the
//! path the container is saved to. Each operation runs start to finish
//! under one lock:
//!
//! 1. surface a deferred load error, once
//! 2. observe the open tabs and let the current session follow them
//! 3. validate and mutate the registry
//! 4. drive the host tabs and save

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tabset_session::{
    Session, SessionError, SessionFlags, SessionRegistry, SessionStore, SessionSummary,
    SessionsData,
};
use tabset_tabs::{sort_by_name, FileEntry, LiveTabs, OpenReport, TabSource};

use crate::config::Config;
use crate::preview::{CreatePreview, UpdatePreview, UpdateRequest};
use crate::Result;

struct Inner<T> {
    data: SessionsData,
    data_path: PathBuf,
    tabs: T,
}

pub struct Workspace<T: TabSource> {
    workspace: String,
    store: Arc<dyn SessionStore>,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: TabSource> Workspace<T> {
    /// Load the container at `data_path`. Never fails: an unreadable store
    /// is reported by the first operation instead.
    pub fn new(
        store: Arc<dyn SessionStore>,
        tabs: T,
        data_path: impl Into<PathBuf>,
        workspace: impl Into<String>,
    ) -> Self {
        let data_path = data_path.into();
        let workspace = workspace.into();
        let data = store.load(&data_path);

        tracing::info!(
            workspace = %workspace,
            path = %data_path.display(),
            sessions = data.registry(&workspace).map_or(0, SessionRegistry::len),
            load_failed = data.has_load_error(),
            "Workspace opened"
        );

        Self {
            workspace,
            store,
            inner: Arc::new(Mutex::new(Inner {
                data,
                data_path,
                tabs,
            })),
        }
    }

    pub fn from_config(config: &Config, tabs: T) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.format.store(),
            tabs,
            config.data_path.clone(),
            config.workspace.clone(),
        ))
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn data_path(&self) -> PathBuf {
        self.inner.lock().data_path.clone()
    }

    pub fn has_load_error(&self) -> bool {
        self.inner.lock().data.has_load_error()
    }

    /// Run `f` against the host tabs under the workspace lock.
    pub fn with_tabs<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock().tabs)
    }

    // === Reads ===

    pub fn session_names(&self) -> Vec<String> {
        self.read(|registry| registry.names().into_iter().map(String::from).collect())
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.read(SessionRegistry::summaries)
    }

    pub fn current_name(&self) -> Option<String> {
        self.read(|registry| registry.current_name().map(String::from))
    }

    pub fn previous_name(&self) -> Option<String> {
        self.read(|registry| registry.previous_name().map(String::from))
    }

    pub fn session(&self, name: &str) -> Option<Session> {
        self.read(|registry| registry.get(name).cloned())
    }

    fn read<R>(&self, f: impl FnOnce(&SessionRegistry) -> R) -> R {
        let inner = self.inner.lock();
        match inner.data.registry(&self.workspace) {
            Some(registry) => f(registry),
            None => f(&SessionRegistry::new()),
        }
    }

    // === Operations ===

    /// Save the open tabs as session `name`.
    pub fn create(&self, name: &str, flags: SessionFlags, switch_to: bool) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let live = self.begin(inner)?;
        inner
            .data
            .registry_mut(&self.workspace)
            .create(name, flags, live, switch_to)?;

        self.persist(inner)
    }

    /// What the create prompt shows. Stored sessions are left as they are.
    pub fn preview_create(&self) -> Result<CreatePreview> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let live = self.observe(inner)?;
        let empty = SessionRegistry::new();
        let registry = inner.data.registry(&self.workspace).unwrap_or(&empty);

        Ok(CreatePreview {
            live_file_names: live.file_names(),
            defaults: registry
                .current_session()
                .map(Session::flags)
                .unwrap_or_default(),
            current: registry.current_name().map(String::from),
        })
    }

    /// Rename and reconfigure the current session. Returns whether it took
    /// the open tabs.
    pub fn update(
        &self,
        new_name: &str,
        flags: SessionFlags,
        update_snapshot: bool,
    ) -> Result<bool> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let live = self.begin(inner)?;
        let adopted = inner.data.registry_mut(&self.workspace).update(
            new_name,
            flags,
            live,
            update_snapshot,
        )?;

        self.persist(inner)?;
        Ok(adopted)
    }

    /// What the update prompt shows, as if a live current session had
    /// already followed the open tabs. Stored sessions are left as they are.
    pub fn preview_update(&self) -> Result<UpdatePreview> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let live = self.observe(inner)?;
        let mut registry = inner
            .data
            .registry(&self.workspace)
            .cloned()
            .unwrap_or_default();
        registry.track_live(live.clone());
        build_update_preview(&registry, &live)
    }

    /// Update after asking `confirm`. A `None` answer cancels and yields
    /// `Ok(None)`.
    ///
    /// `confirm` runs while the workspace lock is held. It must not call
    /// back into this `Workspace` or any clone of it, or it deadlocks. The
    /// preview carries everything the prompt needs.
    pub fn update_with<F>(&self, confirm: F) -> Result<Option<bool>>
    where
        F: FnOnce(&UpdatePreview) -> Option<UpdateRequest>,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let live = self.begin(inner)?;
        let registry = inner.data.registry_mut(&self.workspace);
        let preview = build_update_preview(registry, &live)?;

        let Some(request) = confirm(&preview) else {
            tracing::debug!(session = %preview.name, "Update cancelled");
            return Ok(None);
        };

        let adopted =
            registry.update(&request.name, request.flags, live, request.update_snapshot)?;

        self.persist(inner)?;
        Ok(Some(adopted))
    }

    /// Make `name` current and replace the open tabs with its files.
    pub fn select(&self, name: &str, flags: SessionFlags) -> Result<OpenReport> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        self.begin(inner)?;
        let (files, active) = {
            let session = inner
                .data
                .registry_mut(&self.workspace)
                .select(name, flags)?;
            (
                session.ordered_files(),
                session.active_file().map(String::from),
            )
        };

        self.persist(inner)?;
        restore_tabs(&mut inner.tabs, &files, active.as_deref())
    }

    /// Select the previous session with its own flags.
    pub fn switch_back(&self) -> Result<OpenReport> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        self.begin(inner)?;
        let (files, active) = {
            let session = inner.data.registry_mut(&self.workspace).switch_back()?;
            (
                session.ordered_files(),
                session.active_file().map(String::from),
            )
        };

        self.persist(inner)?;
        restore_tabs(&mut inner.tabs, &files, active.as_deref())
    }

    /// Delete `name`, or the current session. Returns the deleted name,
    /// `None` when nothing was current and no name was given.
    pub fn delete(&self, name: Option<&str>) -> Result<Option<String>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        self.begin(inner)?;
        let deleted = inner.data.registry_mut(&self.workspace).delete(name)?;

        if deleted.is_some() {
            self.persist(inner)?;
        } else {
            tracing::debug!("Nothing to delete");
        }
        Ok(deleted)
    }

    /// Reorder the open tabs by file name, keeping the focused tab.
    pub fn alphabetize(&self) -> Result<OpenReport> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let LiveTabs { mut files, active } = self.begin(inner)?;
        if files.is_empty() {
            return Ok(OpenReport::default());
        }

        sort_by_name(&mut files);
        let report = restore_tabs(&mut inner.tabs, &files, active.as_deref())?;

        let reordered = inner.tabs.capture()?;
        inner.data.registry_mut(&self.workspace).track_live(reordered);

        tracing::info!(files = files.len(), "Alphabetized open tabs");

        self.persist(inner)?;
        Ok(report)
    }

    /// Replace the whole container with the one stored at `path`. Later
    /// saves still go to the primary path.
    pub fn import(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SessionError::Load {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            }
            .into());
        }

        let mut imported = self.store.load(path);
        if let Some(e) = imported.take_load_error() {
            return Err(e.into());
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(pending) = inner.data.take_load_error() {
            tracing::warn!(error = %pending, "Discarding unread store on import");
        }

        inner.data = imported;
        tracing::info!(
            from = %path.display(),
            workspaces = inner.data.workspace_names().len(),
            "Imported sessions"
        );

        self.persist(inner)
    }

    /// Write the whole container to `path`. The primary path is unchanged.
    pub fn export(&self, path: &Path) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        self.begin(inner)?;
        self.store.save(&inner.data, path)?;

        tracing::info!(to = %path.display(), "Exported sessions");
        Ok(())
    }

    /// Save to the primary path, following the open tabs first when the
    /// host can report them.
    pub fn save(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(e) = inner.data.take_load_error() {
            return Err(e.into());
        }

        match inner.tabs.capture() {
            Ok(live) => {
                inner.data.registry_mut(&self.workspace).track_live(live);
            }
            Err(e) => tracing::warn!(error = %e, "Saving without observing open tabs"),
        }

        self.persist(inner)
    }

    /// Common entry of every operation.
    fn begin(&self, inner: &mut Inner<T>) -> Result<LiveTabs> {
        let live = self.observe(inner)?;
        inner
            .data
            .registry_mut(&self.workspace)
            .track_live(live.clone());

        Ok(live)
    }

    /// Report a pending load error, then capture the open tabs.
    fn observe(&self, inner: &mut Inner<T>) -> Result<LiveTabs> {
        if let Some(e) = inner.data.take_load_error() {
            return Err(e.into());
        }
        Ok(inner.tabs.capture()?)
    }

    fn persist(&self, inner: &Inner<T>) -> Result<()> {
        if let Err(e) = self.store.save(&inner.data, &inner.data_path) {
            tracing::error!(
                path = %inner.data_path.display(),
                error = %e,
                "Failed to save sessions"
            );
            return Err(e.into());
        }
        Ok(())
    }
}

impl<T: TabSource> Clone for Workspace<T> {
    fn clone(&self) -> Self {
        Self {
            workspace: self.workspace.clone(),
            store: Arc::clone(&self.store),
            inner: Arc::clone(&self.inner),
        }
    }
}

fn build_update_preview(registry: &SessionRegistry, live: &LiveTabs) -> Result<UpdatePreview> {
    let name = registry
        .current_name()
        .ok_or(SessionError::NoCurrentSession)?;
    let session = registry
        .current_session()
        .ok_or_else(|| SessionError::NotFound(name.to_string()))?;

    Ok(UpdatePreview {
        name: name.to_string(),
        flags: session.flags(),
        stored_file_names: session.file_names(),
        live_file_names: live.file_names(),
        diff: session.diff(&live.files),
    })
}

fn restore_tabs<T: TabSource>(
    tabs: &mut T,
    files: &[FileEntry],
    active: Option<&str>,
) -> Result<OpenReport> {
    tabs.close_all()?;
    let report = tabs.open_files(files, active)?;

    if !report.is_complete() {
        tracing::warn!(
            failed = report.failed.len(),
            opened = report.opened.len(),
            "Some files could not be reopened"
        );
    }

    Ok(report)
}
