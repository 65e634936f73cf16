//! Pure navigation state transitions.
//! Every result satisfies: Mobile forces Collapsed with the override flag set,
//! any other size renders the user's intent.

use super::types::{NavigationEvent, NavigationState, PanelState, ScreenSize, StateChangeSource};

fn derive(user_intent: PanelState, screen_size: ScreenSize) -> NavigationState {
    let is_responsive_override = screen_size == ScreenSize::Mobile;
    let current_state = if is_responsive_override {
        PanelState::Collapsed
    } else {
        user_intent
    };

    NavigationState {
        current_state,
        user_intent,
        screen_size,
        is_responsive_override,
    }
}

pub fn create_initial_state(
    persisted_intent: Option<PanelState>,
    initial_screen_size: ScreenSize,
) -> NavigationState {
    derive(persisted_intent.unwrap_or_default(), initial_screen_size)
}

pub fn handle_user_action(state: NavigationState, new_intent: PanelState) -> NavigationState {
    derive(new_intent, state.screen_size)
}

pub fn handle_screen_size_change(
    state: NavigationState,
    new_screen_size: ScreenSize,
) -> NavigationState {
    derive(state.user_intent, new_screen_size)
}

/// Sign-out resets intent to `Expanded`; sign-in leaves the panel alone.
pub fn handle_auth_change(state: NavigationState, is_authenticated: bool) -> NavigationState {
    if is_authenticated {
        return state;
    }
    derive(PanelState::Expanded, state.screen_size)
}

/// Applies one event. `apply(s, e)` is the single dispatch point for the controller.
pub fn apply(state: NavigationState, event: NavigationEvent) -> NavigationState {
    match event {
        NavigationEvent::UserAction(intent) => handle_user_action(state, intent),
        NavigationEvent::ScreenSizeChanged(size) => handle_screen_size_change(state, size),
        NavigationEvent::AuthChanged { is_authenticated } => {
            handle_auth_change(state, is_authenticated)
        }
    }
}

/// Returns false when the proposed event would leave every field unchanged.
///
/// Only resize dispatch is gated on this. For `UserAction` and `AuthChange`
/// the proposed size is taken as the size the event is applied at.
pub fn should_trigger_state_change(
    state: &NavigationState,
    proposed_source: StateChangeSource,
    proposed_screen_size: ScreenSize,
) -> bool {
    let next = match proposed_source {
        StateChangeSource::ResponsiveResize => {
            handle_screen_size_change(*state, proposed_screen_size)
        }
        StateChangeSource::UserAction => derive(state.user_intent, proposed_screen_size),
        StateChangeSource::AuthChange => derive(PanelState::Expanded, proposed_screen_size),
    };
    next != *state
}
