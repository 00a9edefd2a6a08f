//! Consumer-side binding for a daily activity screen
//!
//! An `ActivityMonitor` holds one adapter for its whole lifetime, listens for
//! availability transitions, and keeps the last values it managed to read so
//! a failed refresh never blanks the screen.

use crate::adapter::HealthAdapter;
use crate::observer::Subscription;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::warn;

/// Message recorded when a refresh is attempted while unavailable
pub const NOT_AVAILABLE_MESSAGE: &str = "HealthKit is not available.";

/// Values a view renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivitySnapshot {
    pub steps: u64,
    pub distance_miles: f64,
    pub is_available: bool,
    /// Last error message, cleared by the next fully successful refresh
    pub error: Option<String>,
}

pub struct ActivityMonitor {
    adapter: Arc<HealthAdapter>,
    snapshot: Mutex<ActivitySnapshot>,
    changed: Arc<Notify>,
    _subscription: Subscription,
}

impl ActivityMonitor {
    /// Bind to `adapter`; the observer is released when the monitor drops
    pub fn attach(adapter: Arc<HealthAdapter>) -> Self {
        let changed = Arc::new(Notify::new());
        let notify = changed.clone();
        let subscription = adapter.subscribe(move || notify.notify_one());

        let snapshot = ActivitySnapshot {
            is_available: adapter.is_available(),
            ..ActivitySnapshot::default()
        };

        Self {
            adapter,
            snapshot: Mutex::new(snapshot),
            changed,
            _subscription: subscription,
        }
    }

    pub fn adapter(&self) -> &Arc<HealthAdapter> {
        &self.adapter
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        let mut snapshot = self.snapshot.lock().clone();
        snapshot.is_available = self.adapter.is_available();
        snapshot
    }

    /// Wait for the next availability notification.
    ///
    /// A notification that fired since the last call is returned immediately.
    pub async fn changed(&self) -> bool {
        self.changed.notified().await;
        self.adapter.is_available()
    }

    /// Re-read distance and steps, keeping last-known values on failure
    pub async fn refresh(&self) -> ActivitySnapshot {
        if !self.adapter.is_available() {
            let mut snapshot = self.snapshot.lock();
            snapshot.is_available = false;
            snapshot.error = Some(NOT_AVAILABLE_MESSAGE.to_string());
            return snapshot.clone();
        }

        let distance = self.adapter.get_distance_walking().await;
        let steps = self.adapter.get_steps_count().await;

        let mut snapshot = self.snapshot.lock();
        snapshot.is_available = self.adapter.is_available();
        let mut errors = Vec::new();

        match distance {
            Ok(miles) => snapshot.distance_miles = miles,
            Err(e) => {
                warn!("Walking distance refresh failed: {}", e);
                errors.push(e.to_string());
            }
        }

        match steps {
            Ok(count) => snapshot.steps = count,
            Err(e) => {
                warn!("Step count refresh failed: {}", e);
                errors.push(e.to_string());
            }
        }

        snapshot.error = if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        };
        snapshot.clone()
    }
}

impl std::fmt::Debug for ActivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityMonitor")
            .field("adapter", &self.adapter)
            .field("snapshot", &*self.snapshot.lock())
            .finish()
    }
}
