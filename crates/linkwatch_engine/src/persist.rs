use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::settings::{Settings, SettingsError, SettingsStore};

/// Settings kept in a JSON file. Writes go to a temp file in the same
/// directory and are renamed over the target, so readers never see half a file.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl SettingsStore for FileSettingsStore {
    /// A missing file reads as default settings.
    fn load(&self) -> Result<Settings, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn stored_channel_url(&self) -> Option<String> {
        let text = fs::read_to_string(&self.path).ok()?;
        let stored: serde_json::Value = serde_json::from_str(&text).ok()?;
        stored.get("channelUrl")?.as_str().map(str::to_string)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let dir = self.directory();
        fs::create_dir_all(&dir)?;

        let content = serde_json::to_string_pretty(settings)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| SettingsError::Io(e.error))?;
        Ok(())
    }
}
