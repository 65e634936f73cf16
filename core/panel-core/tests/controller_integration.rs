//! Integration tests for the panel controller against real stores.

use std::sync::Arc;

use panel_core::{
    Breakpoints, CleanupRegistry, CookieJar, FileStore, IntentStore, KeyValueStore, MemoryStore,
    PanelController, PanelState, ScreenSize, StateChangeSource, Viewport, LEGACY_COOKIE_KEY,
    USER_INTENT_KEY,
};
use tempfile::tempdir;

fn controller(
    store: IntentStore,
    registry: &CleanupRegistry,
    viewport: &Viewport,
) -> PanelController {
    let mut controller =
        PanelController::new(Breakpoints::default(), store, registry.clone(), viewport.clone());
    controller.start();
    controller
}

#[test]
fn test_end_to_end_scenario() {
    let session = Arc::new(MemoryStore::new());
    let store = IntentStore::new(session.clone(), Arc::new(CookieJar::new()));
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(1200.0);
    let panel = controller(store, &registry, &viewport);

    let state = panel.navigation_state();
    assert_eq!(state.screen_size, ScreenSize::Desktop);
    assert_eq!(state.current_state, PanelState::Expanded);
    assert!(!state.is_responsive_override);

    panel.collapse(StateChangeSource::UserAction);
    assert_eq!(panel.state(), PanelState::Collapsed);
    assert_eq!(panel.user_intent(), PanelState::Collapsed);
    assert_eq!(
        session.get(USER_INTENT_KEY).unwrap(),
        Some("Collapsed".to_string())
    );

    viewport.resize(400.0);
    assert_eq!(panel.state(), PanelState::Collapsed);
    assert!(panel.is_responsive_override());

    viewport.resize(1300.0);
    assert_eq!(panel.state(), PanelState::Collapsed);
    assert!(!panel.is_responsive_override());

    registry.execute_all();
    assert_eq!(panel.user_intent(), PanelState::Expanded);
    assert_eq!(session.get(USER_INTENT_KEY).unwrap(), None);
}

#[test]
fn test_intent_survives_remount_within_session() {
    let temp = tempdir().unwrap();
    let session: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::new(&temp.path().join("session.json")));
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(1200.0);

    let first = controller(
        IntentStore::new(session.clone(), Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    first.collapse(StateChangeSource::UserAction);
    drop(first);
    assert!(registry.is_empty());

    let second = controller(
        IntentStore::new(session, Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    assert_eq!(second.state(), PanelState::Collapsed);
    assert_eq!(second.user_intent(), PanelState::Collapsed);
}

#[test]
fn test_legacy_cookie_migrated_on_start() {
    let session = Arc::new(MemoryStore::new());
    let cookies = Arc::new(CookieJar::from_header(&format!(
        "{}=true; theme=dark",
        LEGACY_COOKIE_KEY
    )));
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(1200.0);

    let panel = controller(
        IntentStore::new(session.clone(), cookies.clone()),
        &registry,
        &viewport,
    );
    assert_eq!(panel.state(), PanelState::Collapsed);
    assert_eq!(cookies.to_header(), "theme=dark");
    assert_eq!(
        session.get(USER_INTENT_KEY).unwrap(),
        Some("Collapsed".to_string())
    );
    drop(panel);

    // Second mount reads session storage; the cookie is gone
    let panel = controller(IntentStore::new(session, cookies), &registry, &viewport);
    assert_eq!(panel.state(), PanelState::Collapsed);
}

#[test]
fn test_malformed_persisted_value_falls_back_to_expanded() {
    let session = Arc::new(MemoryStore::new());
    session.set(USER_INTENT_KEY, "sideways").unwrap();
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(900.0);

    let panel = controller(
        IntentStore::new(session, Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    assert_eq!(panel.screen_size(), ScreenSize::Tablet);
    assert_eq!(panel.state(), PanelState::Expanded);
}

#[test]
fn test_multiple_controllers_share_registry_and_key() {
    let session = Arc::new(MemoryStore::new());
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(1200.0);

    let a = controller(
        IntentStore::new(session.clone(), Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    let b = controller(
        IntentStore::new(session.clone(), Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    assert_eq!(registry.len(), 2);
    assert_eq!(viewport.listener_count(), 2);

    a.collapse(StateChangeSource::UserAction);
    b.expand(StateChangeSource::UserAction);
    // Last write wins
    assert_eq!(
        session.get(USER_INTENT_KEY).unwrap(),
        Some("Expanded".to_string())
    );

    viewport.resize(300.0);
    assert!(a.is_mobile());
    assert!(b.is_mobile());

    let report = registry.execute_all();
    assert_eq!(report.executed, 2);
    assert_eq!(a.user_intent(), PanelState::Expanded);
    assert_eq!(b.user_intent(), PanelState::Expanded);
    assert!(session.is_empty());
}

#[test]
fn test_other_owners_cleanup_runs_even_if_one_fails() {
    let session = Arc::new(MemoryStore::new());
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(1200.0);

    registry.register(|| Err("unrelated store failed".to_string()));
    let panel = controller(
        IntentStore::new(session.clone(), Arc::new(CookieJar::new())),
        &registry,
        &viewport,
    );
    panel.collapse(StateChangeSource::UserAction);

    let report = registry.execute_all();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.executed, 1);
    assert_eq!(panel.user_intent(), PanelState::Expanded);
    assert!(session.is_empty());
}

#[test]
fn test_custom_breakpoints_drive_classification() {
    let registry = CleanupRegistry::new();
    let viewport = Viewport::new(700.0);
    let mut panel = PanelController::new(
        Breakpoints::new(600, 1200).unwrap(),
        IntentStore::new(Arc::new(MemoryStore::new()), Arc::new(CookieJar::new())),
        registry,
        viewport.clone(),
    );
    panel.start();
    assert_eq!(panel.screen_size(), ScreenSize::Tablet);

    viewport.resize(1100.0);
    assert_eq!(panel.screen_size(), ScreenSize::Tablet);
    viewport.resize(1200.0);
    assert_eq!(panel.screen_size(), ScreenSize::Desktop);
}
