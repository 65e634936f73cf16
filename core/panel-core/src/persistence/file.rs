//! JSON-file key-value store.
//!
//! Session-storage analogue for hosts without a browser. The file is re-read on
//! every access so separate processes sharing a session see each other's writes
//! (last write wins).
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": { "panel_user_intent": "Collapsed" }
//! }
//! ```
//!
//! Empty, corrupt, or wrong-version files read as empty. Writes go through a
//! temp file + rename so a crash never leaves a partial file behind.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs_err as fs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use super::KeyValueStore;
use crate::error::{PanelError, Result};

const FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        StoreFile {
            version: FILE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<StoreFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(err) => return Err(PanelError::storage("read", err.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(StoreFile::default());
        }

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) if file.version == FILE_VERSION => Ok(file),
            Ok(file) => {
                warn!(
                    path = %self.path.display(),
                    version = file.version,
                    "Unsupported store file version, treating as empty"
                );
                Ok(StoreFile::default())
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Corrupt store file, treating as empty");
                Ok(StoreFile::default())
            }
        }
    }

    fn save(&self, file: &StoreFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file).map_err(|source| PanelError::Json {
            context: "serializing store file".to_string(),
            source,
        })?;

        let parent = self
            .path
            .parent()
            .ok_or_else(|| PanelError::storage("write", "store path has no parent directory"))?;
        fs::create_dir_all(parent).map_err(|e| PanelError::storage("write", e.to_string()))?;

        let mut temp =
            NamedTempFile::new_in(parent).map_err(|e| PanelError::storage("write", e.to_string()))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| PanelError::storage("write", e.to_string()))?;
        temp.persist(&self.path)
            .map_err(|e| PanelError::storage("write", e.error.to_string()))?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = self.load()?;
        if f(&mut file.entries) {
            self.save(&file)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}
