//! File-backed host environment for one CLI invocation.
//!
//! Session storage lives in `session.json`; legacy cookies live in
//! `cookies.txt` as a single cookie header line.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use fs_err as fs;
use serde::Serialize;

use panel_core::{
    load_config, CleanupRegistry, CookieJar, FileStore, IntentStore, KeyValueStore,
    NavigationState, PanelConfig, PanelController, PanelState, StorageConfig, Viewport,
};

#[derive(Debug, Serialize)]
pub struct Report {
    pub navigation: NavigationState,
    pub open_mobile: bool,
    pub persisted_intent: Option<PanelState>,
    pub legacy_cookie_present: bool,
}

pub struct Host {
    storage: StorageConfig,
    config: PanelConfig,
    store: IntentStore,
    cookies: Arc<CookieJar>,
    registry: CleanupRegistry,
    viewport: Viewport,
}

impl Host {
    pub fn open(root: Option<PathBuf>, width: f64) -> Result<Self, String> {
        let storage = root.map(StorageConfig::with_root).unwrap_or_default();

        let config = match load_config(&storage.config_file()) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load config; using defaults");
                PanelConfig::default()
            }
        };

        let header = match fs::read_to_string(storage.cookie_file()) {
            Ok(header) => header,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => return Err(format!("Failed to read cookies: {}", err)),
        };
        let cookies = Arc::new(CookieJar::from_header(header.trim()));
        let session = Arc::new(FileStore::new(&storage.session_file()));
        let store = IntentStore::from_config(&config, session, cookies.clone());

        Ok(Self {
            storage,
            config,
            store,
            cookies,
            registry: CleanupRegistry::new(),
            viewport: Viewport::new(width),
        })
    }

    pub fn mount(&self) -> PanelController {
        let mut panel = PanelController::new(
            self.config.breakpoints,
            self.store.clone(),
            self.registry.clone(),
            self.viewport.clone(),
        );
        panel.start();
        panel
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn registry(&self) -> &CleanupRegistry {
        &self.registry
    }

    pub fn seed_legacy(&self, collapsed: bool) {
        let value = if collapsed { "true" } else { "false" };
        // CookieJar writes are infallible
        let _ = self.cookies.set(&self.config.legacy_cookie, value);
    }

    pub fn report(&self, panel: &PanelController) -> Report {
        Report {
            navigation: panel.navigation_state(),
            open_mobile: panel.open_mobile(),
            persisted_intent: self.store.get_user_intent(),
            legacy_cookie_present: self.cookies.contains(&self.config.legacy_cookie),
        }
    }

    /// Writes the cookie jar back to disk.
    pub fn close(self) -> Result<(), String> {
        let path = self.storage.cookie_file();
        let header = self.cookies.to_header();

        if header.is_empty() {
            return match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(format!("Failed to remove cookies: {}", err)),
            };
        }

        fs::create_dir_all(self.storage.root())
            .map_err(|e| format!("Failed to create storage dir: {}", e))?;
        fs::write(&path, format!("{}\n", header))
            .map_err(|e| format!("Failed to write cookies: {}", e))
    }
}
