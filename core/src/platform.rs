//! Platform identification and provider dispatch
//!
//! The hosting app reports which platform it runs on (`"ios"`, `"android"`,
//! anything else). [`PlatformDispatcher`] maps that tag to the registered
//! [`HealthProvider`]; unrecognized tags and platforms with no registered
//! provider get an [`UnsupportedProvider`].

use crate::provider::{HealthProvider, UnsupportedProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// PLATFORM
// ============================================================================

/// Platform the app is running on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// iOS devices (Apple Health)
    Ios,
    /// Android devices (Google Fit)
    Android,
    /// Anything else, keeping the tag the host reported
    Other(String),
}

impl Platform {
    /// Parse a host-reported platform tag
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "ios" => Self::Ios,
            "android" => Self::Android,
            _ => Self::Other(normalized),
        }
    }

    /// Platform of the compile target
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Other(std::env::consts::OS.to_string())
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this is one of the platforms a provider can be registered for
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl From<&str> for Platform {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Provider selection table keyed by platform
#[derive(Clone, Default)]
pub struct PlatformDispatcher {
    providers: HashMap<Platform, Arc<dyn HealthProvider>>,
}

impl PlatformDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the provider for a recognized platform.
    ///
    /// Returns false (and registers nothing) for [`Platform::Other`].
    pub fn register(&mut self, platform: Platform, provider: Arc<dyn HealthProvider>) -> bool {
        if !platform.is_recognized() {
            return false;
        }
        self.providers.insert(platform, provider);
        true
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_provider(mut self, platform: Platform, provider: Arc<dyn HealthProvider>) -> Self {
        self.register(platform, provider);
        self
    }

    /// Provider for `platform`, or the unsupported fallback
    pub fn select(&self, platform: &Platform) -> Arc<dyn HealthProvider> {
        match self.providers.get(platform) {
            Some(provider) if platform.is_recognized() => {
                debug!("Selected {} provider for {}", provider.name(), platform);
                provider.clone()
            }
            _ => {
                debug!("No provider for {}, using fallback", platform);
                Arc::new(UnsupportedProvider::new(platform.tag()))
            }
        }
    }

    pub fn is_supported(&self, platform: &Platform) -> bool {
        platform.is_recognized() && self.providers.contains_key(platform)
    }

    pub fn registered_platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.providers.keys().cloned().collect();
        platforms.sort_by(|a, b| a.tag().cmp(b.tag()));
        platforms
    }
}

impl std::fmt::Debug for PlatformDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformDispatcher")
            .field("platforms", &self.registered_platforms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHealthProvider;

    fn named(name: &'static str) -> Arc<dyn HealthProvider> {
        let mut mock = MockHealthProvider::new();
        mock.expect_name().return_const(name);
        Arc::new(mock)
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(Platform::from_tag("ios"), Platform::Ios);
        assert_eq!(Platform::from_tag(" Android "), Platform::Android);
        assert_eq!(Platform::from_tag("IOS"), Platform::Ios);
        assert_eq!(
            Platform::from_tag("windows"),
            Platform::Other("windows".into())
        );
    }

    #[test]
    fn test_tag_roundtrip_display() {
        assert_eq!(Platform::Ios.to_string(), "ios");
        assert_eq!(Platform::Android.to_string(), "android");
        assert_eq!(Platform::Other("web".into()).to_string(), "web");
    }

    #[test]
    fn test_current_platform_is_consistent() {
        let current = Platform::current();
        if cfg!(any(target_os = "ios", target_os = "android")) {
            assert!(current.is_recognized());
        } else {
            assert!(!current.is_recognized());
        }
    }

    #[test]
    fn test_select_registered_provider() {
        let dispatcher = PlatformDispatcher::new()
            .with_provider(Platform::Ios, named("apple-health"))
            .with_provider(Platform::Android, named("google-fit"));

        assert_eq!(dispatcher.select(&Platform::Ios).name(), "apple-health");
        assert_eq!(dispatcher.select(&Platform::Android).name(), "google-fit");
    }

    #[test]
    fn test_select_unknown_uses_fallback() {
        let dispatcher =
            PlatformDispatcher::new().with_provider(Platform::Ios, named("apple-health"));

        assert_eq!(
            dispatcher.select(&Platform::from_tag("unknown")).name(),
            "unsupported"
        );
        assert_eq!(dispatcher.select(&Platform::Android).name(), "unsupported");
    }

    #[test]
    fn test_other_platform_cannot_be_registered() {
        let mut dispatcher = PlatformDispatcher::new();
        assert!(!dispatcher.register(Platform::Other("web".into()), named("web")));
        assert!(!dispatcher.is_supported(&Platform::Other("web".into())));
        assert!(dispatcher.registered_platforms().is_empty());
    }

    #[test]
    fn test_registered_platforms_sorted() {
        let dispatcher = PlatformDispatcher::new()
            .with_provider(Platform::Ios, named("apple-health"))
            .with_provider(Platform::Android, named("google-fit"));

        assert_eq!(
            dispatcher.registered_platforms(),
            vec![Platform::Android, Platform::Ios]
        );
        assert!(dispatcher.is_supported(&Platform::Ios));
    }
}
