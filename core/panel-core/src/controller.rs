//! Panel controller: owns the live [`NavigationState`] and wires it to its inputs.
//!
//! ```text
//! Viewport::resize ──→ classify ──→ should_trigger? ──→ transition ──┐
//! toggle/expand/collapse ─────────→ transition ──→ IntentStore::set  ├─→ state + listeners
//! CleanupRegistry::execute_all ──→ clear storage ──→ transition ─────┘
//! ```
//!
//! Construction reads persisted intent (migrating the legacy cookie first) and
//! the current viewport width. [`PanelController::start`] subscribes to resize
//! notifications and registers the sign-out callback; [`PanelController::stop`]
//! (or drop) undoes both exactly once.
//!
//! Storage failures never reach callers: they are logged and the in-memory
//! state carries on alone.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info, warn};

use crate::cleanup::{CleanupHandle, CleanupRegistry};
use crate::persistence::IntentStore;
use crate::state::{
    self, NavigationEvent, NavigationState, PanelState, ScreenSize, StateChangeSource,
};
use crate::viewport::{Breakpoints, ResizeEvent, SubscriptionId, Viewport};

/// Key that toggles the panel together with Ctrl (or Cmd).
pub const TOGGLE_SHORTCUT_KEY: char = 'b';

pub type StateListener = Arc<dyn Fn(&NavigationState, StateChangeSource) + Send + Sync>;

/// Identifies a state listener for [`PanelController::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ControllerCore {
    state: NavigationState,
    /// Mobile overlay visibility. Never persisted.
    open_mobile: bool,
    next_listener: u64,
    listeners: Vec<(ListenerId, StateListener)>,
}

type SharedCore = Arc<Mutex<ControllerCore>>;

fn lock(core: &Mutex<ControllerCore>) -> MutexGuard<'_, ControllerCore> {
    core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Applies `event` under the lock. Returns the listeners to notify, empty
/// when the state did not change.
fn commit(
    core: &Mutex<ControllerCore>,
    event: NavigationEvent,
) -> (NavigationState, Vec<StateListener>) {
    let mut guard = lock(core);
    let previous = guard.state;
    let next = state::apply(previous, event);
    guard.state = next;
    if next == previous {
        return (next, Vec::new());
    }
    let listeners = guard.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
    (next, listeners)
}

/// Must be called with the core lock released.
fn notify(event: NavigationEvent, next: &NavigationState, listeners: Vec<StateListener>) {
    if listeners.is_empty() {
        return;
    }
    debug!(event = ?event, state = ?next, "Navigation state changed");
    let source = event.source();
    for listener in listeners {
        listener(next, source);
    }
}

/// Applies `event` and notifies listeners if anything changed.
fn dispatch(core: &Mutex<ControllerCore>, event: NavigationEvent) -> NavigationState {
    let (next, listeners) = commit(core, event);
    notify(event, &next, listeners);
    next
}

fn on_resize(core: &Mutex<ControllerCore>, breakpoints: Breakpoints, event: ResizeEvent) {
    let Some(width) = event.width() else {
        debug!(inner_width = event.inner_width, "Ignoring malformed resize event");
        return;
    };
    let size = breakpoints.classify(width);

    let should_dispatch = {
        let guard = lock(core);
        state::should_trigger_state_change(&guard.state, StateChangeSource::ResponsiveResize, size)
    };
    if should_dispatch {
        dispatch(core, NavigationEvent::ScreenSizeChanged(size));
    }
}

fn sign_out(core: &Mutex<ControllerCore>, store: &IntentStore) {
    store.clear_user_intent();
    lock(core).open_mobile = false;
    dispatch(
        core,
        NavigationEvent::AuthChanged {
            is_authenticated: false,
        },
    );
}

pub struct PanelController {
    breakpoints: Breakpoints,
    store: IntentStore,
    registry: CleanupRegistry,
    viewport: Viewport,
    core: SharedCore,
    resize_subscription: Option<SubscriptionId>,
    cleanup_handle: Option<CleanupHandle>,
}

impl PanelController {
    /// Builds the initial state from persisted intent and the current width.
    ///
    /// A malformed initial width is treated as `Desktop` so the user's intent
    /// is shown until the first valid resize arrives.
    pub fn new(
        breakpoints: Breakpoints,
        store: IntentStore,
        registry: CleanupRegistry,
        viewport: Viewport,
    ) -> Self {
        let persisted = store
            .migrate_legacy_cookie()
            .or_else(|| store.get_user_intent());

        let current = viewport.current();
        let screen_size = match current.width() {
            Some(width) => breakpoints.classify(width),
            None => {
                debug!(inner_width = current.inner_width, "Malformed initial width, assuming desktop");
                ScreenSize::Desktop
            }
        };

        let initial = state::create_initial_state(persisted, screen_size);
        debug!(state = ?initial, persisted = ?persisted, "Panel controller initialized");

        Self {
            breakpoints,
            store,
            registry,
            viewport,
            core: Arc::new(Mutex::new(ControllerCore {
                state: initial,
                open_mobile: false,
                next_listener: 0,
                listeners: Vec::new(),
            })),
            resize_subscription: None,
            cleanup_handle: None,
        }
    }

    /// Subscribes to resize notifications and registers the sign-out callback.
    /// Calling it again while started does nothing.
    pub fn start(&mut self) {
        if self.is_started() {
            return;
        }

        // Width may have changed between construction and start
        on_resize(&self.core, self.breakpoints, self.viewport.current());

        let weak: Weak<Mutex<ControllerCore>> = Arc::downgrade(&self.core);
        let breakpoints = self.breakpoints;
        let listener = move |event: ResizeEvent| {
            if let Some(core) = weak.upgrade() {
                on_resize(&core, breakpoints, event);
            }
        };
        self.resize_subscription = Some(self.viewport.subscribe(Arc::new(listener)));

        let weak = Arc::downgrade(&self.core);
        let store = self.store.clone();
        self.cleanup_handle = Some(self.registry.register(move || {
            if let Some(core) = weak.upgrade() {
                sign_out(&core, &store);
            }
            Ok(())
        }));

        info!(state = ?self.navigation_state(), "Panel controller started");
    }

    /// Removes the resize subscription and the sign-out callback.
    pub fn stop(&mut self) {
        if let Some(id) = self.resize_subscription.take() {
            if !self.viewport.unsubscribe(id) {
                warn!("Resize subscription already removed");
            }
        }
        if let Some(handle) = self.cleanup_handle.take() {
            if !handle.unregister() {
                warn!("Cleanup callback already unregistered");
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.resize_subscription.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// What is actually rendered.
    pub fn state(&self) -> PanelState {
        lock(&self.core).state.current_state
    }

    pub fn navigation_state(&self) -> NavigationState {
        lock(&self.core).state
    }

    pub fn user_intent(&self) -> PanelState {
        lock(&self.core).state.user_intent
    }

    pub fn is_responsive_override(&self) -> bool {
        lock(&self.core).state.is_responsive_override
    }

    pub fn screen_size(&self) -> ScreenSize {
        lock(&self.core).state.screen_size
    }

    pub fn is_mobile(&self) -> bool {
        lock(&self.core).state.is_mobile()
    }

    // ─────────────────────────────────────────────────────────────────────
    // User Actions
    // ─────────────────────────────────────────────────────────────────────

    pub fn toggle(&self, source: StateChangeSource) -> NavigationState {
        let target = self.user_intent().toggled();
        self.apply_user_intent(target, source)
    }

    pub fn expand(&self, source: StateChangeSource) -> NavigationState {
        self.apply_user_intent(PanelState::Expanded, source)
    }

    pub fn collapse(&self, source: StateChangeSource) -> NavigationState {
        self.apply_user_intent(PanelState::Collapsed, source)
    }

    /// Toggles on Ctrl/Cmd + `b`. Returns true if the key was handled.
    pub fn handle_shortcut(&self, key: char, ctrl_or_meta: bool) -> bool {
        if !ctrl_or_meta || !key.eq_ignore_ascii_case(&TOGGLE_SHORTCUT_KEY) {
            return false;
        }
        self.toggle(StateChangeSource::UserAction);
        true
    }

    /// Explicit actions always apply and always persist, even when nothing
    /// changes, so storage re-confirms the user's choice.
    fn apply_user_intent(&self, intent: PanelState, source: StateChangeSource) -> NavigationState {
        if source != StateChangeSource::UserAction {
            debug!(source = ?source, "Panel action requested with non-user source; treating as user action");
        }

        // Persist before listeners run so a listener that signs out has the
        // last word on storage.
        let event = NavigationEvent::UserAction(intent);
        let (next, listeners) = commit(&self.core, event);
        if let Err(err) = self
            .store
            .set_user_intent(intent, StateChangeSource::UserAction)
        {
            warn!(error = %err, intent = ?intent, "Failed to persist panel intent");
        }
        notify(event, &next, listeners);
        next
    }

    // ─────────────────────────────────────────────────────────────────────
    // Viewport & Authentication
    // ─────────────────────────────────────────────────────────────────────

    /// Applies an already-classified size. Never writes storage.
    pub fn handle_screen_size_change(&self, size: ScreenSize) -> NavigationState {
        let should_dispatch = state::should_trigger_state_change(
            &self.navigation_state(),
            StateChangeSource::ResponsiveResize,
            size,
        );
        if should_dispatch {
            dispatch(&self.core, NavigationEvent::ScreenSizeChanged(size))
        } else {
            self.navigation_state()
        }
    }

    /// Sign-out clears persisted intent and resets to defaults. Sign-in is a no-op.
    pub fn handle_authentication_change(&self, is_authenticated: bool) -> NavigationState {
        if is_authenticated {
            return dispatch(
                &self.core,
                NavigationEvent::AuthChanged {
                    is_authenticated: true,
                },
            );
        }
        sign_out(&self.core, &self.store);
        self.navigation_state()
    }

    /// Routes an event to the matching handler, with that handler's persistence rules.
    pub fn dispatch(&self, event: NavigationEvent) -> NavigationState {
        match event {
            NavigationEvent::UserAction(intent) => {
                self.apply_user_intent(intent, StateChangeSource::UserAction)
            }
            NavigationEvent::ScreenSizeChanged(size) => self.handle_screen_size_change(size),
            NavigationEvent::AuthChanged { is_authenticated } => {
                self.handle_authentication_change(is_authenticated)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mobile Overlay
    // ─────────────────────────────────────────────────────────────────────

    pub fn open_mobile(&self) -> bool {
        lock(&self.core).open_mobile
    }

    pub fn set_open_mobile(&self, open: bool) {
        lock(&self.core).open_mobile = open;
    }

    pub fn toggle_open_mobile(&self) -> bool {
        let mut core = lock(&self.core);
        core.open_mobile = !core.open_mobile;
        core.open_mobile
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a listener called after every transition that changed state.
    pub fn subscribe(&self, listener: StateListener) -> ListenerId {
        let mut core = lock(&self.core);
        let id = ListenerId(core.next_listener);
        core.next_listener += 1;
        core.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut core = lock(&self.core);
        let before = core.listeners.len();
        core.listeners.retain(|(existing, _)| *existing != id);
        core.listeners.len() != before
    }
}

impl Drop for PanelController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PanelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelController")
            .field("state", &self.navigation_state())
            .field("open_mobile", &self.open_mobile())
            .field("started", &self.is_started())
            .finish()
    }
}
