// Health Core — daily steps and walking distance
//
// One adapter, one provider per platform, one availability flag.
// Everything a screen needs to show today's steps and miles.

pub mod adapter;
pub mod monitor;
pub mod observer;
pub mod platform;
pub mod provider;
pub mod settings;
pub mod units;

// Mobile bridge modules
pub mod mobile_bridge;
pub mod native_bridge;

pub use adapter::{Availability, HealthAdapter};
pub use monitor::{ActivityMonitor, ActivitySnapshot};
pub use observer::{NotifyReport, Observer, ObserverRegistry, Subscription};
pub use platform::{Platform, PlatformDispatcher};
pub use provider::{
    AndroidProvider, HealthProvider, InitError, IosProvider, NativeError, ProviderQueryError,
    UnsupportedProvider,
};
pub use settings::{HealthSettings, SettingsError};
pub use units::{meters_to_miles, DayRange, METERS_PER_MILE};

// Mobile bridge exports for UniFFI
pub use mobile_bridge::{
    AvailabilityObserver, AvailabilitySubscription, BridgeError, BridgeSettings, HealthBridge,
};
pub use native_bridge::{
    AppleHealthSource, AuthorizeOutcome, DayWindow, DistanceQuery, DistanceSample,
    GoogleFitSource, HealthValue, SourceError, StepCountQuery, StepSample, StepSourceBucket,
};

uniffi::include_scaffolding!("health");

/// Install the global `tracing` subscriber (idempotent).
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();
}

/// Dispatcher wired with the Apple Health and Google Fit providers.
///
/// Hosts only have one of the two SDKs; pass `None` for the other.
pub fn default_dispatcher(
    apple: Option<std::sync::Arc<dyn provider::ios::AppleHealthStore>>,
    google: Option<std::sync::Arc<dyn provider::android::GoogleFitClient>>,
    settings: &HealthSettings,
) -> PlatformDispatcher {
    let mut dispatcher = PlatformDispatcher::new();
    if let Some(store) = apple {
        let provider = IosProvider::new(store)
            .with_manually_added(settings.include_manually_added_steps);
        dispatcher.register(Platform::Ios, std::sync::Arc::new(provider));
    }
    if let Some(client) = google {
        dispatcher.register(
            Platform::Android,
            std::sync::Arc::new(AndroidProvider::new(client)),
        );
    }
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("debug");
        init_logging("info");
        tracing::info!("logging initialized twice without panicking");
    }

    #[test]
    fn test_default_dispatcher_without_sdks() {
        let dispatcher = default_dispatcher(None, None, &HealthSettings::default());
        assert!(dispatcher.registered_platforms().is_empty());
        assert_eq!(dispatcher.select(&Platform::Ios).name(), "unsupported");
    }
}
