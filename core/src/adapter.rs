//! Health data adapter
//!
//! Platform code creates a `HealthAdapter` once per consumer lifetime. The
//! adapter picks its provider through the [`PlatformDispatcher`] at
//! construction, owns the availability flag and the observer registry, and
//! exposes the same step/distance queries on every platform.
//!
//! Availability only changes when an initialization attempt settles. Queries
//! made while unavailable resolve to zero without reaching the provider.

use crate::observer::{Observer, ObserverRegistry, Subscription};
use crate::platform::{Platform, PlatformDispatcher};
use crate::provider::{HealthProvider, InitError, ProviderQueryError};
use crate::settings::{HealthSettings, SettingsError};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

// ============================================================================
// STATE
// ============================================================================

/// Whether the platform health provider is authorized and usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// Initial state, and the state after any failed initialization
    #[default]
    Unavailable,
    /// Permissions granted by the last initialization
    Available,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Available => write!(f, "Available"),
        }
    }
}

#[derive(Debug, Default)]
struct AdapterState {
    availability: Availability,
    last_init_error: Option<InitError>,
    init_attempts: u32,
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct HealthAdapter {
    platform: Platform,
    provider: Arc<dyn HealthProvider>,
    settings: HealthSettings,
    state: RwLock<AdapterState>,
    observers: ObserverRegistry,
    /// Serializes initialization attempts
    init_lock: tokio::sync::Mutex<()>,
}

impl HealthAdapter {
    /// Create an adapter for `platform` without initializing it
    pub fn new(
        platform: Platform,
        dispatcher: &PlatformDispatcher,
        settings: HealthSettings,
    ) -> Result<Self, SettingsError> {
        let provider = dispatcher.select(&platform);
        Self::with_provider(platform, provider, settings)
    }

    /// Create an adapter around an explicit provider.
    ///
    /// Fails if `settings` does not pass [`HealthSettings::validate`].
    pub fn with_provider(
        platform: Platform,
        provider: Arc<dyn HealthProvider>,
        settings: HealthSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            platform,
            provider,
            settings,
            state: RwLock::new(AdapterState::default()),
            observers: ObserverRegistry::new(),
            init_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Create an adapter and start its construction-time initialization.
    ///
    /// Must be called from within a tokio runtime. Observers subscribed right
    /// after this returns are notified when the attempt settles.
    pub fn launch(
        platform: Platform,
        dispatcher: &PlatformDispatcher,
        settings: HealthSettings,
    ) -> Result<Arc<Self>, SettingsError> {
        let adapter = Arc::new(Self::new(platform, dispatcher, settings)?);
        adapter.spawn_initialize();
        Ok(adapter)
    }

    /// Run [`initialize`](Self::initialize) on the current tokio runtime
    pub fn spawn_initialize(self: &Arc<Self>) -> tokio::task::JoinHandle<Availability> {
        let adapter = Arc::clone(self);
        tokio::spawn(async move { adapter.initialize().await })
    }

    /// Request permissions from the platform provider.
    ///
    /// Never fails: the outcome is recorded as the new availability, and all
    /// observers are notified before this returns.
    pub async fn initialize(&self) -> Availability {
        let _guard = self.init_lock.lock().await;

        info!(
            "Initializing health data on {} via {}",
            self.platform,
            self.provider.name()
        );

        let outcome = match self.settings.permission_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.provider.request_permissions())
                .await
                .unwrap_or(Err(InitError::TimedOut(limit))),
            None => self.provider.request_permissions().await,
        };

        let availability = {
            let mut state = self.state.write();
            state.init_attempts += 1;
            match outcome {
                Ok(()) => {
                    info!("Health data initialized");
                    state.availability = Availability::Available;
                    state.last_init_error = None;
                }
                Err(e) => {
                    error!("Error initializing health data: {}", e);
                    state.availability = Availability::Unavailable;
                    state.last_init_error = Some(e);
                }
            }
            state.availability
        };

        self.notify_observers();
        availability
    }

    /// Steps taken today, or 0 while unavailable
    pub async fn get_steps_count(&self) -> Result<u64, ProviderQueryError> {
        if !self.is_available() {
            info!("Health data is not available; reporting 0 steps");
            return Ok(0);
        }

        debug!("Querying step count via {}", self.provider.name());
        let steps = self.bounded(self.provider.steps_today()).await?;
        debug!("Step count: {}", steps);
        Ok(steps)
    }

    /// Miles walked today, or 0 while unavailable
    pub async fn get_distance_walking(&self) -> Result<f64, ProviderQueryError> {
        if !self.is_available() {
            info!("Health data is not available; reporting 0 miles");
            return Ok(0.0);
        }

        debug!("Querying walking distance via {}", self.provider.name());
        let miles = self.bounded(self.provider.distance_today()).await?;
        debug!("Walking distance: {} mi", miles);
        Ok(miles)
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, ProviderQueryError>
    where
        F: Future<Output = Result<T, ProviderQueryError>>,
    {
        match self.settings.query_timeout() {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .unwrap_or(Err(ProviderQueryError::TimedOut(limit))),
            None => query.await,
        }
    }

    /// Register a closure for availability transitions
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(callback))
    }

    /// Register a shared observer; the same `Arc` is only registered once
    pub fn subscribe_observer(&self, observer: Observer) -> Subscription {
        self.observers.subscribe(observer)
    }

    /// Remove every registration of `observer`
    pub fn unsubscribe(&self, observer: &Observer) -> usize {
        self.observers.unsubscribe(observer)
    }

    pub(crate) fn notify_observers(&self) {
        let report = self.observers.notify();
        debug!(
            "Notified {} availability observers ({} panicked)",
            report.delivered, report.panicked
        );
    }

    pub fn availability(&self) -> Availability {
        self.state.read().availability
    }

    pub fn is_available(&self) -> bool {
        self.availability().is_available()
    }

    /// Failure reason of the most recent initialization, if it failed
    pub fn last_init_error(&self) -> Option<InitError> {
        self.state.read().last_init_error.clone()
    }

    /// Number of initialization attempts that have settled
    pub fn init_attempts(&self) -> u32 {
        self.state.read().init_attempts
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    /// Query timeout in effect, if any
    pub fn query_timeout(&self) -> Option<Duration> {
        self.settings.query_timeout()
    }
}

impl std::fmt::Debug for HealthAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAdapter")
            .field("platform", &self.platform)
            .field("provider", &self.provider.name())
            .field("availability", &self.availability())
            .field("observers", &self.observers.len())
            .finish()
    }
}
