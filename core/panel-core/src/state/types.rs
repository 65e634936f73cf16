//! Navigation state types shared by the calculator, store, and controller.

use serde::{Deserialize, Serialize};

/// Visibility of the collapsible panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelState {
    #[default]
    Expanded,
    Collapsed,
}

impl PanelState {
    /// Storage literal for this state. Round-trips through [`PanelState::from_storage`].
    pub fn as_str(self) -> &'static str {
        match self {
            PanelState::Expanded => "Expanded",
            PanelState::Collapsed => "Collapsed",
        }
    }

    /// Parses a storage literal. Anything other than an exact match yields `None`.
    pub fn from_storage(value: &str) -> Option<Self> {
        match value {
            "Expanded" => Some(PanelState::Expanded),
            "Collapsed" => Some(PanelState::Collapsed),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PanelState::Expanded => PanelState::Collapsed,
            PanelState::Collapsed => PanelState::Expanded,
        }
    }
}

/// Viewport classification. Ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScreenSize {
    Mobile,
    Tablet,
    Desktop,
}

/// Which signal produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateChangeSource {
    UserAction,
    ResponsiveResize,
    AuthChange,
}

/// Aggregate panel state.
///
/// `current_state` is what is rendered; `user_intent` is the last explicit
/// choice. They only diverge on `Mobile`, where `is_responsive_override` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub current_state: PanelState,
    pub user_intent: PanelState,
    pub screen_size: ScreenSize,
    pub is_responsive_override: bool,
}

impl NavigationState {
    pub fn is_mobile(&self) -> bool {
        self.screen_size == ScreenSize::Mobile
    }
}

/// A single input to the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    UserAction(PanelState),
    ScreenSizeChanged(ScreenSize),
    AuthChanged { is_authenticated: bool },
}

impl NavigationEvent {
    pub fn source(&self) -> StateChangeSource {
        match self {
            NavigationEvent::UserAction(_) => StateChangeSource::UserAction,
            NavigationEvent::ScreenSizeChanged(_) => StateChangeSource::ResponsiveResize,
            NavigationEvent::AuthChanged { .. } => StateChangeSource::AuthChange,
        }
    }
}
