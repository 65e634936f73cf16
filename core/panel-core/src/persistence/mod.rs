//! Session-scoped persistence of the user's panel intent.
//!
//! Storage is abstracted behind [`KeyValueStore`] so the same controller runs
//! against browser session storage, a JSON file, or an in-memory map.
//!
//! # Module Structure
//!
//! - [`intent`]: Typed get/set/clear/migrate over two key-value stores
//! - [`file`]: JSON-file store with atomic writes
//! - [`cookie`]: `document.cookie`-style jar holding the legacy representation
//!
//! # Defensive Design
//!
//! Every operation returns a `Result`; nothing panics on unavailable storage or
//! malformed data. [`IntentStore`] turns those errors into "no persisted value".

mod cookie;
mod file;
mod intent;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{PanelError, Result};

pub use cookie::CookieJar;
pub use file::FileStore;
pub use intent::{IntentStore, LEGACY_COOKIE_KEY, USER_INTENT_KEY};

/// Minimal key-value storage. Implementations use interior mutability so a
/// single store can be shared between controllers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store. Can be switched to "unavailable" to emulate restricted
/// browsing modes or quota exhaustion.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self
            .unavailable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = unavailable;
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, operation: &str) -> Result<()> {
        let unavailable = *self
            .unavailable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if unavailable {
            return Err(PanelError::storage(operation, "storage disabled"));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check("get")?;
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check("set")?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check("remove")?;
        self.entries().remove(key);
        Ok(())
    }
}
