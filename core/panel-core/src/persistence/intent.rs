//! Typed access to the persisted user intent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::KeyValueStore;
use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::state::{PanelState, StateChangeSource};

/// Default session-storage key holding `"Expanded"` or `"Collapsed"`.
pub const USER_INTENT_KEY: &str = "panel_user_intent";
/// Default legacy cookie holding `"true"` when the panel was collapsed.
pub const LEGACY_COOKIE_KEY: &str = "sidebar_collapsed";

fn parse_legacy(value: &str) -> Option<PanelState> {
    match value {
        "true" => Some(PanelState::Collapsed),
        "false" => Some(PanelState::Expanded),
        _ => None,
    }
}

/// Reads and writes the user's panel intent.
///
/// `session` is session-scoped storage; `legacy` holds the cookie-based
/// representation consumed by [`IntentStore::migrate_legacy_cookie`].
#[derive(Clone)]
pub struct IntentStore {
    session: Arc<dyn KeyValueStore>,
    legacy: Arc<dyn KeyValueStore>,
    intent_key: String,
    legacy_key: String,
}

impl IntentStore {
    pub fn new(session: Arc<dyn KeyValueStore>, legacy: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(session, legacy, USER_INTENT_KEY, LEGACY_COOKIE_KEY)
    }

    pub fn from_config(
        config: &PanelConfig,
        session: Arc<dyn KeyValueStore>,
        legacy: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_keys(session, legacy, &config.intent_key, &config.legacy_cookie)
    }

    pub fn with_keys(
        session: Arc<dyn KeyValueStore>,
        legacy: Arc<dyn KeyValueStore>,
        intent_key: &str,
        legacy_key: &str,
    ) -> Self {
        Self {
            session,
            legacy,
            intent_key: intent_key.to_string(),
            legacy_key: legacy_key.to_string(),
        }
    }

    /// Returns the stored intent, or `None` if absent, malformed, or unreadable.
    pub fn get_user_intent(&self) -> Option<PanelState> {
        let value = match self.session.get(&self.intent_key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "Failed to read persisted panel intent");
                return None;
            }
        };

        let parsed = PanelState::from_storage(&value);
        if parsed.is_none() {
            let err = PanelError::InvalidPersistedValue {
                key: self.intent_key.clone(),
                value,
            };
            debug!(error = %err, "Ignoring persisted panel intent");
        }
        parsed
    }

    /// Persists `intent`. Only `UserAction` sources may write.
    pub fn set_user_intent(&self, intent: PanelState, source: StateChangeSource) -> Result<()> {
        if source != StateChangeSource::UserAction {
            return Err(PanelError::PersistenceNotPermitted { origin: source });
        }
        self.session.set(&self.intent_key, intent.as_str())
    }

    /// Removes the stored intent. Idempotent; failures are logged only.
    pub fn clear_user_intent(&self) {
        if let Err(err) = self.session.remove(&self.intent_key) {
            warn!(error = %err, "Failed to clear persisted panel intent");
        }
    }

    /// Moves a legacy cookie value into session storage.
    ///
    /// Returns the migrated intent once; with no cookie present it returns
    /// `None` and touches nothing. An unparseable cookie is deleted. If the
    /// session write fails the cookie is kept so a later start-up can retry.
    pub fn migrate_legacy_cookie(&self) -> Option<PanelState> {
        let raw = match self.legacy.get(&self.legacy_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "Failed to read legacy panel cookie");
                return None;
            }
        };

        let Some(intent) = parse_legacy(&raw) else {
            debug!(value = %raw, "Discarding unrecognized legacy panel cookie");
            self.remove_legacy();
            return None;
        };

        match self.session.set(&self.intent_key, intent.as_str()) {
            Ok(()) => {
                self.remove_legacy();
                info!(intent = ?intent, "Migrated legacy panel cookie to session storage");
            }
            Err(err) => {
                warn!(error = %err, "Failed to migrate legacy panel cookie; keeping it");
            }
        }
        Some(intent)
    }

    fn remove_legacy(&self) {
        if let Err(err) = self.legacy.remove(&self.legacy_key) {
            warn!(error = %err, "Failed to delete legacy panel cookie");
        }
    }
}

impl std::fmt::Debug for IntentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentStore")
            .field("intent_key", &self.intent_key)
            .field("legacy_key", &self.legacy_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{CookieJar, MemoryStore};

    fn make_store() -> (IntentStore, Arc<MemoryStore>, Arc<CookieJar>) {
        let session = Arc::new(MemoryStore::new());
        let legacy = Arc::new(CookieJar::new());
        let store = IntentStore::new(session.clone(), legacy.clone());
        (store, session, legacy)
    }

    #[test]
    fn test_get_absent_returns_none() {
        let (store, _, _) = make_store();
        assert_eq!(store.get_user_intent(), None);
    }

    #[test]
    fn test_set_then_get() {
        let (store, session, _) = make_store();
        store
            .set_user_intent(PanelState::Collapsed, StateChangeSource::UserAction)
            .unwrap();
        assert_eq!(store.get_user_intent(), Some(PanelState::Collapsed));
        assert_eq!(
            session.get(USER_INTENT_KEY).unwrap(),
            Some("Collapsed".to_string())
        );
    }

    #[test]
    fn test_set_rejects_non_user_sources() {
        let (store, session, _) = make_store();
        for source in [
            StateChangeSource::ResponsiveResize,
            StateChangeSource::AuthChange,
        ] {
            let result = store.set_user_intent(PanelState::Collapsed, source);
            assert!(matches!(
                result,
                Err(PanelError::PersistenceNotPermitted { .. })
            ));
        }
        assert!(session.is_empty());
    }

    #[test]
    fn test_malformed_value_reads_as_none() {
        let (store, session, _) = make_store();
        session.set(USER_INTENT_KEY, "collapsed").unwrap();
        assert_eq!(store.get_user_intent(), None);
    }

    #[test]
    fn test_unavailable_storage() {
        let (store, session, _) = make_store();
        session.set_unavailable(true);

        assert_eq!(store.get_user_intent(), None);
        assert!(matches!(
            store.set_user_intent(PanelState::Collapsed, StateChangeSource::UserAction),
            Err(PanelError::StorageUnavailable { .. })
        ));
        store.clear_user_intent();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (store, _, _) = make_store();
        store
            .set_user_intent(PanelState::Expanded, StateChangeSource::UserAction)
            .unwrap();
        store.clear_user_intent();
        store.clear_user_intent();
        assert_eq!(store.get_user_intent(), None);
    }

    #[test]
    fn test_migrate_collapsed_cookie_once() {
        let (store, session, legacy) = make_store();
        legacy.set(LEGACY_COOKIE_KEY, "true").unwrap();

        assert_eq!(store.migrate_legacy_cookie(), Some(PanelState::Collapsed));
        assert!(!legacy.contains(LEGACY_COOKIE_KEY));
        assert_eq!(
            session.get(USER_INTENT_KEY).unwrap(),
            Some("Collapsed".to_string())
        );

        assert_eq!(store.migrate_legacy_cookie(), None);
    }

    #[test]
    fn test_migrate_expanded_cookie() {
        let (store, _, legacy) = make_store();
        legacy.set(LEGACY_COOKIE_KEY, "false").unwrap();
        assert_eq!(store.migrate_legacy_cookie(), Some(PanelState::Expanded));
        assert_eq!(store.get_user_intent(), Some(PanelState::Expanded));
    }

    #[test]
    fn test_migrate_without_cookie_has_no_side_effects() {
        let (store, session, legacy) = make_store();
        legacy.set("theme", "dark").unwrap();

        assert_eq!(store.migrate_legacy_cookie(), None);
        assert!(session.is_empty());
        assert_eq!(legacy.to_header(), "theme=dark");
    }

    #[test]
    fn test_migrate_invalid_cookie_is_discarded() {
        let (store, session, legacy) = make_store();
        legacy.set(LEGACY_COOKIE_KEY, "maybe").unwrap();

        assert_eq!(store.migrate_legacy_cookie(), None);
        assert!(!legacy.contains(LEGACY_COOKIE_KEY));
        assert!(session.is_empty());
    }

    #[test]
    fn test_migrate_keeps_cookie_when_session_write_fails() {
        let (store, session, legacy) = make_store();
        legacy.set(LEGACY_COOKIE_KEY, "true").unwrap();
        session.set_unavailable(true);

        assert_eq!(store.migrate_legacy_cookie(), Some(PanelState::Collapsed));
        assert!(legacy.contains(LEGACY_COOKIE_KEY));
    }

    #[test]
    fn test_custom_keys() {
        let session = Arc::new(MemoryStore::new());
        let legacy = Arc::new(CookieJar::from_header("old_panel=true"));
        let store = IntentStore::with_keys(session.clone(), legacy, "intent", "old_panel");

        assert_eq!(store.migrate_legacy_cookie(), Some(PanelState::Collapsed));
        assert_eq!(session.get("intent").unwrap(), Some("Collapsed".to_string()));
    }
}
