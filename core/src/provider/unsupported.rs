//! Fallback provider for platforms without a health SDK

use super::{HealthProvider, InitError, ProviderQueryError};
use async_trait::async_trait;

/// Reports the platform as unsupported on initialization and answers
/// every query with zero.
#[derive(Debug, Clone)]
pub struct UnsupportedProvider {
    platform: String,
}

impl UnsupportedProvider {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }
}

#[async_trait]
impl HealthProvider for UnsupportedProvider {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn request_permissions(&self) -> Result<(), InitError> {
        Err(InitError::UnsupportedPlatform(self.platform.clone()))
    }

    async fn steps_today(&self) -> Result<u64, ProviderQueryError> {
        Ok(0)
    }

    async fn distance_today(&self) -> Result<f64, ProviderQueryError> {
        Ok(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_reports_platform() {
        let provider = UnsupportedProvider::new("web");
        assert_eq!(
            provider.request_permissions().await,
            Err(InitError::UnsupportedPlatform("web".into()))
        );
    }

    #[tokio::test]
    async fn test_queries_resolve_to_zero() {
        let provider = UnsupportedProvider::new("web");
        assert_eq!(provider.steps_today().await, Ok(0));
        assert_eq!(provider.distance_today().await, Ok(0.0));
    }
}
