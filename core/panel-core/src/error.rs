//! Error types for panel-core operations.
//! Nothing here is fatal: callers recover locally and fall back to defaults.

use std::path::PathBuf;

use crate::state::StateChangeSource;

/// All errors that can occur in panel-core operations.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    // ─────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Storage unavailable during {operation}: {reason}")]
    StorageUnavailable { operation: String, reason: String },

    #[error("Invalid persisted value for {key}: {value:?}")]
    InvalidPersistedValue { key: String, value: String },

    #[error("Persistence is only permitted for user actions (got {origin:?})")]
    PersistenceNotPermitted { origin: StateChangeSource },

    // ─────────────────────────────────────────────────────────────────────
    // Cleanup Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Cleanup callback {id} failed: {message}")]
    CallbackFailure { id: u64, message: String },

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid breakpoints: mobile_max ({mobile_max}) must be below tablet_max ({tablet_max})")]
    InvalidBreakpoints { mobile_max: u32, tablet_max: u32 },

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PanelError {
    pub(crate) fn storage(operation: &str, reason: impl Into<String>) -> Self {
        PanelError::StorageUnavailable {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using PanelError.
pub type Result<T> = std::result::Result<T, PanelError>;
