//! Availability observer registry
//!
//! Observers are zero-argument callbacks invoked, in registration order,
//! every time an initialization attempt settles. A callback is identified by
//! its `Arc`: subscribing the same `Arc` twice keeps a single entry, which
//! stays registered until every guard for it has been released.
//!
//! Notification snapshots the registry and releases the lock before calling
//! out, so observers may subscribe, unsubscribe or query the adapter from
//! inside the callback. A panicking observer is logged and skipped.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::warn;

/// Callback invoked on every availability transition
pub type Observer = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    id: u64,
    callback: Observer,
    /// Live guards sharing this entry
    holders: usize,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<Registration>,
}

impl RegistryInner {
    /// Drop one guard's hold on `id`; the entry goes when no holder is left
    fn release_id(&mut self, id: u64) {
        if let Some(pos) = self.entries.iter().position(|entry| entry.id == id) {
            let entry = &mut self.entries[pos];
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                self.entries.remove(pos);
            }
        }
    }
}

/// Outcome of one notification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotifyReport {
    /// Observers that returned normally
    pub delivered: usize,
    /// Observers that panicked
    pub panicked: usize,
}

/// Ordered set of availability observers
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` and return the guard that removes it again.
    ///
    /// If the same `Arc` is already registered, the returned guard shares the
    /// existing entry, which is removed once all its guards are released.
    pub fn subscribe(&self, callback: Observer) -> Subscription {
        let mut inner = self.inner.lock();

        let existing = inner
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.callback, &callback));

        let id = match existing {
            Some(pos) => {
                let entry = &mut inner.entries[pos];
                entry.holders += 1;
                entry.id
            }
            None => {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.entries.push(Registration {
                    id,
                    callback,
                    holders: 1,
                });
                id
            }
        };

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Remove every registration of `callback` regardless of outstanding
    /// guards; returns how many were removed
    pub fn unsubscribe(&self, callback: &Observer) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|entry| !Arc::ptr_eq(&entry.callback, callback));
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered observer in registration order
    pub fn notify(&self) -> NotifyReport {
        let snapshot: Vec<(u64, Observer)> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|entry| (entry.id, entry.callback.clone()))
            .collect();

        let mut report = NotifyReport::default();
        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    warn!("Availability observer #{} panicked; continuing", id);
                    report.panicked += 1;
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

// ============================================================================
// SUBSCRIPTION GUARD
// ============================================================================

/// Handle to one registration.
///
/// Dropping the handle unsubscribes; call [`detach`](Self::detach) to keep
/// the observer registered for the registry's lifetime instead.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<RegistryInner>>,
}

impl Subscription {
    /// Release this guard's hold on the registration
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the registration alive without holding the guard
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }

    /// Whether the registration is still present
    pub fn is_active(&self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => inner.lock().entries.iter().any(|entry| entry.id == self.id),
            None => false,
        }
    }

    fn release(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.lock().release_id(self.id);
        }
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
