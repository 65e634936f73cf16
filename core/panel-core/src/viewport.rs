//! Viewport classification and resize notification.
//!
//! [`Breakpoints::classify`] maps a pixel width to a [`ScreenSize`].
//! [`Viewport`] stands in for the host's resize events: hosts call
//! [`Viewport::resize`] and every subscriber receives a [`ResizeEvent`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PanelError, Result};
use crate::state::ScreenSize;

/// Widths below this are `Mobile`.
pub const MOBILE_MAX: u32 = 768;
/// Widths below this (and at least `MOBILE_MAX`) are `Tablet`.
pub const TABLET_MAX: u32 = 1024;

/// Two ordered pixel breakpoints, `mobile_max < tablet_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBreakpoints")]
pub struct Breakpoints {
    mobile_max: u32,
    tablet_max: u32,
}

#[derive(Deserialize)]
struct RawBreakpoints {
    mobile_max: u32,
    tablet_max: u32,
}

impl TryFrom<RawBreakpoints> for Breakpoints {
    type Error = PanelError;

    fn try_from(raw: RawBreakpoints) -> Result<Self> {
        Breakpoints::new(raw.mobile_max, raw.tablet_max)
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile_max: MOBILE_MAX,
            tablet_max: TABLET_MAX,
        }
    }
}

impl Breakpoints {
    pub fn new(mobile_max: u32, tablet_max: u32) -> Result<Self> {
        if mobile_max >= tablet_max {
            return Err(PanelError::InvalidBreakpoints {
                mobile_max,
                tablet_max,
            });
        }
        Ok(Self {
            mobile_max,
            tablet_max,
        })
    }

    pub fn mobile_max(&self) -> u32 {
        self.mobile_max
    }

    pub fn tablet_max(&self) -> u32 {
        self.tablet_max
    }

    pub fn classify(&self, width: u32) -> ScreenSize {
        if width < self.mobile_max {
            ScreenSize::Mobile
        } else if width < self.tablet_max {
            ScreenSize::Tablet
        } else {
            ScreenSize::Desktop
        }
    }
}

/// Classifies against the default breakpoints.
pub fn classify(width: u32) -> ScreenSize {
    Breakpoints::default().classify(width)
}

/// A resize notification as delivered by the host.
///
/// Hosts report fractional, and occasionally garbage, widths; use
/// [`ResizeEvent::width`] to get a usable pixel count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub inner_width: f64,
}

impl ResizeEvent {
    pub fn new(inner_width: f64) -> Self {
        Self { inner_width }
    }

    /// Whole-pixel width, or `None` for negative or non-finite values.
    pub fn width(&self) -> Option<u32> {
        let w = self.inner_width;
        if !w.is_finite() || w < 0.0 {
            return None;
        }
        Some(w.min(u32::MAX as f64) as u32)
    }
}

pub type ResizeListener = Arc<dyn Fn(ResizeEvent) + Send + Sync>;

/// Identifies a resize subscription for [`Viewport::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct ViewportInner {
    inner_width: f64,
    next_id: u64,
    listeners: Vec<(SubscriptionId, ResizeListener)>,
}

/// Shared handle to the host viewport. Clones observe the same viewport.
#[derive(Clone)]
pub struct Viewport {
    inner: Arc<Mutex<ViewportInner>>,
}

impl Viewport {
    pub fn new(inner_width: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewportInner {
                inner_width,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewportInner> {
        // Recover from poisoning - listener list is still structurally valid
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> ResizeEvent {
        ResizeEvent::new(self.lock().inner_width)
    }

    pub fn subscribe(&self, listener: ResizeListener) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Records the new width and notifies subscribers in subscription order.
    pub fn resize(&self, inner_width: f64) {
        let listeners: Vec<ResizeListener> = {
            let mut inner = self.lock();
            inner.inner_width = inner_width;
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        // Lock released before invoking listeners

        debug!(inner_width, listeners = listeners.len(), "Viewport resized");
        let event = ResizeEvent::new(inner_width);
        for listener in listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Viewport")
            .field("inner_width", &inner.inner_width)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}
