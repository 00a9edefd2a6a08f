// HealthBridge — the object Swift/Kotlin hold for the lifetime of a screen
//
// Each bridge owns a small tokio runtime and one launched HealthAdapter.
// Every exported method blocks the calling (foreign) thread until the core
// answers, so none of them may be called from inside the bridge's runtime.
// Foreign observers are therefore delivered on the runtime's blocking pool,
// from where they are free to query the bridge again.

use crate::native_bridge::{AppleHealthSource, ForeignAppleStore, ForeignGoogleFit, GoogleFitSource};
use crate::{
    HealthAdapter, HealthSettings, Platform, PlatformDispatcher, ProviderQueryError,
    SettingsError, Subscription,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// ERRORS & SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("runtime error: {reason}")]
    Runtime { reason: String },
    #[error("invalid settings: {reason}")]
    InvalidSettings { reason: String },
    #[error("query failed: {reason}")]
    Query { reason: String },
    #[error("query timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },
}

impl From<SettingsError> for BridgeError {
    fn from(err: SettingsError) -> Self {
        BridgeError::InvalidSettings {
            reason: err.to_string(),
        }
    }
}

impl From<ProviderQueryError> for BridgeError {
    fn from(err: ProviderQueryError) -> Self {
        match err {
            ProviderQueryError::TimedOut(after) => BridgeError::TimedOut {
                after_ms: after.as_millis() as u64,
            },
            other => BridgeError::Query {
                reason: other.to_string(),
            },
        }
    }
}

/// Foreign-facing mirror of [`HealthSettings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub permission_timeout_ms: Option<u64>,
    pub query_timeout_ms: Option<u64>,
    pub include_manually_added_steps: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        HealthSettings::default().into()
    }
}

impl From<HealthSettings> for BridgeSettings {
    fn from(settings: HealthSettings) -> Self {
        Self {
            permission_timeout_ms: settings.permission_timeout_ms,
            query_timeout_ms: settings.query_timeout_ms,
            include_manually_added_steps: settings.include_manually_added_steps,
        }
    }
}

impl TryFrom<BridgeSettings> for HealthSettings {
    type Error = BridgeError;

    fn try_from(settings: BridgeSettings) -> Result<Self, Self::Error> {
        let settings = HealthSettings {
            permission_timeout_ms: settings.permission_timeout_ms,
            query_timeout_ms: settings.query_timeout_ms,
            include_manually_added_steps: settings.include_manually_added_steps,
        };
        settings.validate()?;
        Ok(settings)
    }
}

// ============================================================================
// OBSERVERS
// ============================================================================

pub trait AvailabilityObserver: Send + Sync {
    fn on_availability_changed(&self);
}

/// Foreign handle to one observer registration; releasing it unsubscribes
pub struct AvailabilitySubscription {
    inner: Mutex<Option<Subscription>>,
    /// Set on cancel; deliveries already queued on the blocking pool check it
    cancelled: Arc<AtomicBool>,
}

impl AvailabilitySubscription {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(subscription) = self.inner.lock().take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .as_ref()
            .map_or(false, |subscription| subscription.is_active())
    }
}

// ============================================================================
// BRIDGE
// ============================================================================

pub struct HealthBridge {
    adapter: Arc<HealthAdapter>,
    runtime: tokio::runtime::Runtime,
}

impl HealthBridge {
    pub fn for_ios(
        source: Box<dyn AppleHealthSource>,
        settings: BridgeSettings,
    ) -> Result<Self, BridgeError> {
        let settings = HealthSettings::try_from(settings)?;
        let store = Arc::new(ForeignAppleStore::new(source));
        let dispatcher = crate::default_dispatcher(Some(store), None, &settings);
        Self::launch(Platform::Ios, &dispatcher, settings)
    }

    pub fn for_android(
        source: Box<dyn GoogleFitSource>,
        settings: BridgeSettings,
    ) -> Result<Self, BridgeError> {
        let settings = HealthSettings::try_from(settings)?;
        let client = Arc::new(ForeignGoogleFit::new(source));
        let dispatcher = crate::default_dispatcher(None, Some(client), &settings);
        Self::launch(Platform::Android, &dispatcher, settings)
    }

    /// Bridge for a host without a health SDK; initialization always fails
    pub fn for_platform(platform: String, settings: BridgeSettings) -> Result<Self, BridgeError> {
        let settings = HealthSettings::try_from(settings)?;
        Self::launch(
            Platform::from_tag(&platform),
            &PlatformDispatcher::new(),
            settings,
        )
    }

    fn launch(
        platform: Platform,
        dispatcher: &PlatformDispatcher,
        settings: HealthSettings,
    ) -> Result<Self, BridgeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("health-core")
            .build()
            .map_err(|e| BridgeError::Runtime {
                reason: e.to_string(),
            })?;

        let adapter = {
            let _context = runtime.enter();
            HealthAdapter::launch(platform, dispatcher, settings)?
        };

        tracing::info!(
            "HealthBridge launched on {} via {}",
            adapter.platform(),
            adapter.provider_name()
        );
        Ok(Self { adapter, runtime })
    }

    /// Re-run the permission flow; returns the resulting availability
    pub fn initialize(&self) -> bool {
        self.runtime
            .block_on(self.adapter.initialize())
            .is_available()
    }

    pub fn is_available(&self) -> bool {
        self.adapter.is_available()
    }

    pub fn last_init_error(&self) -> Option<String> {
        self.adapter.last_init_error().map(|e| e.to_string())
    }

    pub fn platform_tag(&self) -> String {
        self.adapter.platform().tag().to_string()
    }

    pub fn get_steps_count(&self) -> Result<u64, BridgeError> {
        Ok(self.runtime.block_on(self.adapter.get_steps_count())?)
    }

    pub fn get_distance_walking(&self) -> Result<f64, BridgeError> {
        Ok(self.runtime.block_on(self.adapter.get_distance_walking())?)
    }

    /// Register a foreign observer.
    ///
    /// Each notification runs on the bridge's blocking pool, so the observer
    /// may call `get_steps_count` and friends directly. The launch-time
    /// initialization may already have settled; check `is_available()` after
    /// subscribing.
    pub fn subscribe(
        &self,
        observer: Box<dyn AvailabilityObserver>,
    ) -> Arc<AvailabilitySubscription> {
        let observer: Arc<dyn AvailabilityObserver> = Arc::from(observer);
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = self.runtime.handle().clone();

        let flag = cancelled.clone();
        let subscription = self.adapter.subscribe(move || {
            let observer = observer.clone();
            let flag = flag.clone();
            let _ = handle.spawn_blocking(move || {
                if !flag.load(Ordering::Acquire) {
                    observer.on_availability_changed();
                }
            });
        });

        Arc::new(AvailabilitySubscription {
            inner: Mutex::new(Some(subscription)),
            cancelled,
        })
    }
}
