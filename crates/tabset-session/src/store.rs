//! Session persistence seam

use std::path::Path;

use crate::data::SessionsData;
use crate::Result;

/// Reads and writes the whole [`SessionsData`] container at a path.
pub trait SessionStore: Send + Sync {
    /// Read the container at `path`, surfacing every failure.
    fn try_load(&self, path: &Path) -> Result<SessionsData>;

    /// Write the full container to `path`, replacing what was there.
    fn save(&self, data: &SessionsData, path: &Path) -> Result<()>;

    /// Read the container at `path` without failing.
    ///
    /// A missing file is an empty container. Anything unreadable, including
    /// a newer major version, becomes an empty container that carries the
    /// error for [`SessionsData::take_load_error`].
    fn load(&self, path: &Path) -> SessionsData {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No session store yet");
            return SessionsData::new();
        }

        let loaded = self.try_load(path).and_then(|mut data| {
            data.ensure_supported()?;
            data.repair();
            Ok(data)
        });

        match loaded {
            Ok(data) => {
                tracing::info!(
                    path = %path.display(),
                    version = %data.version(),
                    workspaces = data.workspace_names().len(),
                    "Loaded sessions"
                );
                data
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load sessions");
                SessionsData::failed(path, e.to_string())
            }
        }
    }
}
