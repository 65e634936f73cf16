//! Navigation State
//!
//! Decides whether the panel renders expanded or collapsed by reconciling
//! three signals: explicit user choice, viewport size, and sign-out.
//!
//! ```text
//! user action ─┐
//! resize ──────┼─→ transition (pure) ─→ NavigationState ─→ controller
//! sign-out ────┘
//! ```
//!
//! # Module Structure
//!
//! - [`transition`]: Pure functions computing the next state from one event
//! - [`types`]: `PanelState`, `ScreenSize`, `NavigationState`, and events

pub mod transition;
pub(crate) mod types;

pub use transition::{
    apply, create_initial_state, handle_auth_change, handle_screen_size_change,
    handle_user_action, should_trigger_state_change,
};
pub use types::{NavigationEvent, NavigationState, PanelState, ScreenSize, StateChangeSource};
