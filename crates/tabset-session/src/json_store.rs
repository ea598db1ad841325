//! JSON session store
//!
//! Human-readable alternative to the database file. Writes go to a sibling
//! temp file that is renamed over the target.

use std::fs;
use std::path::Path;

use crate::data::SessionsData;
use crate::store::SessionStore;
use crate::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl JsonStore {
    pub fn new() -> Self {
        Self
    }
}

impl SessionStore for JsonStore {
    fn try_load(&self, path: &Path) -> Result<SessionsData> {
        let contents = fs::read_to_string(path)?;
        let data: SessionsData = serde_json::from_str(&contents)?;
        Ok(data)
    }

    fn save(&self, data: &SessionsData, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), "Saved sessions to JSON");
        Ok(())
    }
}
