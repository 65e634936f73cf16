//! Sign-out cleanup registry.
//!
//! Independent state owners register callbacks that scrub session-scoped state.
//! The authentication layer calls [`CleanupRegistry::execute_all`] exactly once
//! per sign-out. The registry is an injected service; clones share one list.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError, Weak};

use tracing::{debug, warn};

use crate::error::PanelError;

pub type CleanupResult = std::result::Result<(), String>;
type Callback = Arc<Mutex<dyn FnMut() -> CleanupResult + Send>>;

/// Identifies one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CleanupId(u64);

struct RegistryInner {
    next_id: u64,
    callbacks: Vec<(CleanupId, Callback)>,
}

#[derive(Clone)]
pub struct CleanupRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl Default for CleanupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_inner(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    // Recover from poisoning - the list itself is never left half-updated
    inner
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn remove(inner: &Mutex<RegistryInner>, id: CleanupId) -> bool {
    let mut guard = lock_inner(inner);
    let before = guard.callbacks.len();
    guard.callbacks.retain(|(existing, _)| *existing != id);
    guard.callbacks.len() != before
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "callback panicked".to_string()
    }
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Appends `callback`. The returned handle removes exactly this registration.
    pub fn register<F>(&self, callback: F) -> CleanupHandle
    where
        F: FnMut() -> CleanupResult + Send + 'static,
    {
        let mut inner = lock_inner(&self.inner);
        let id = CleanupId(inner.next_id);
        inner.next_id += 1;
        let callback: Callback = Arc::new(Mutex::new(callback));
        inner.callbacks.push((id, callback));
        debug!(id = id.0, registered = inner.callbacks.len(), "Cleanup callback registered");

        CleanupHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&self, id: CleanupId) -> bool {
        remove(&self.inner, id)
    }

    pub fn len(&self) -> usize {
        lock_inner(&self.inner).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every registered callback once, in registration order.
    ///
    /// The list is snapshotted first, so callbacks may (un)register freely.
    /// A failing or panicking callback is logged and recorded; the rest still run.
    pub fn execute_all(&self) -> CleanupReport {
        let snapshot: Vec<(CleanupId, Callback)> = lock_inner(&self.inner)
            .callbacks
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        let mut report = CleanupReport::default();
        for (id, callback) in snapshot {
            let guard = match callback.try_lock() {
                Ok(guard) => Some(guard),
                // A previous panic poisoned it; the closure is still callable
                Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => None,
            };
            let outcome = match guard {
                Some(mut f) => panic::catch_unwind(AssertUnwindSafe(|| (*f)()))
                    .unwrap_or_else(|payload| Err(panic_message(payload.as_ref()))),
                None => Err("callback is already running".to_string()),
            };

            match outcome {
                Ok(()) => report.executed += 1,
                Err(message) => {
                    let err = PanelError::CallbackFailure { id: id.0, message };
                    warn!(error = %err, "Cleanup callback failed");
                    report.failures.push(err);
                }
            }
        }

        debug!(
            executed = report.executed,
            failed = report.failures.len(),
            "Cleanup callbacks executed"
        );
        report
    }
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Registration handle. Dropping it does not unregister.
#[derive(Debug)]
pub struct CleanupHandle {
    id: CleanupId,
    registry: Weak<Mutex<RegistryInner>>,
}

impl CleanupHandle {
    pub fn id(&self) -> CleanupId {
        self.id
    }

    /// Removes this registration. Returns false if it was already gone.
    pub fn unregister(self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => remove(&inner, self.id),
            None => false,
        }
    }
}

/// Results from one [`CleanupRegistry::execute_all`] call.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Number of callbacks that completed successfully.
    pub executed: u32,
    /// One `CallbackFailure` per callback that returned an error or panicked.
    pub failures: Vec<PanelError>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
