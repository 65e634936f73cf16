//! # panel-core
//!
//! Panel visibility coordinator: decides whether the collapsible navigation
//! panel is expanded or collapsed, reconciling explicit user choice, viewport
//! size, and sign-out, and persisting the user's intent for the session.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. Every operation has taken effect when it returns.
//! - **Pure core**: [`state::transition`] has no I/O; the controller does the wiring.
//! - **Graceful degradation**: Unavailable or malformed storage falls back to
//!   in-memory state with the panel expanded. Nothing here is fatal.
//! - **Injected services**: Storage, viewport, and cleanup registry are passed in,
//!   so tests build fresh instances.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use panel_core::*;
//!
//! let store = IntentStore::new(Arc::new(MemoryStore::new()), Arc::new(CookieJar::new()));
//! let registry = CleanupRegistry::new();
//! let viewport = Viewport::new(1200.0);
//! let mut panel = PanelController::new(Breakpoints::default(), store, registry.clone(), viewport);
//! panel.start();
//! panel.collapse(StateChangeSource::UserAction);
//! registry.execute_all(); // sign-out
//! ```

pub mod cleanup;
pub mod config;
pub mod controller;
pub mod error;
pub mod persistence;
pub mod state;
pub mod viewport;

pub use cleanup::{CleanupHandle, CleanupId, CleanupRegistry, CleanupReport, CleanupResult};
pub use config::{load_config, PanelConfig, StorageConfig};
pub use controller::{ListenerId, PanelController, StateListener, TOGGLE_SHORTCUT_KEY};
pub use error::{PanelError, Result};
pub use persistence::{
    CookieJar, FileStore, IntentStore, KeyValueStore, MemoryStore, LEGACY_COOKIE_KEY,
    USER_INTENT_KEY,
};
pub use state::{NavigationEvent, NavigationState, PanelState, ScreenSize, StateChangeSource};
pub use viewport::{
    classify, Breakpoints, ResizeEvent, ResizeListener, SubscriptionId, Viewport, MOBILE_MAX,
    TABLET_MAX,
};
