//! Health data provider contract
//!
//! A provider wraps one platform's native health SDK behind three calls:
//! request permissions, read today's step count, read today's walking
//! distance. Every implementation reports failures through the typed errors
//! below so the adapter never has to guess what a native call returned.
//!
//! Implementations in this crate:
//! - [`ios::IosProvider`] over an [`ios::AppleHealthStore`]
//! - [`android::AndroidProvider`] over an [`android::GoogleFitClient`]
//! - [`unsupported::UnsupportedProvider`] as the dispatcher fallback

pub mod android;
pub mod ios;
pub mod unsupported;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use android::AndroidProvider;
pub use ios::IosProvider;
pub use unsupported::UnsupportedProvider;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Why an initialization attempt left the adapter unavailable
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InitError {
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("Authorization denied: {0}")]
    PermissionDenied(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Permission request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failure of a step or distance query against an available provider
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderQueryError {
    #[error("Native query failed: {0}")]
    Native(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid value reported by provider: {0}")]
    InvalidValue(f64),

    #[error("Query timed out after {0:?}")]
    TimedOut(Duration),
}

/// Raw failure surfaced by a native SDK binding
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NativeError {
    /// The user or the OS refused access
    #[error("denied: {0}")]
    Denied(String),

    /// Any other SDK-level error
    #[error("failed: {0}")]
    Failed(String),
}

impl NativeError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Denied(reason) | Self::Failed(reason) => reason,
        }
    }
}

impl From<NativeError> for ProviderQueryError {
    fn from(err: NativeError) -> Self {
        ProviderQueryError::Native(err.reason().to_string())
    }
}

impl From<NativeError> for InitError {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::Denied(reason) => InitError::PermissionDenied(reason),
            NativeError::Failed(reason) => InitError::Provider(reason),
        }
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Platform health data source scoped to the current local day
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Run the platform permission/authorization flow
    async fn request_permissions(&self) -> Result<(), InitError>;

    /// Steps taken since the start of the local day
    async fn steps_today(&self) -> Result<u64, ProviderQueryError>;

    /// Miles walked since the start of the local day
    async fn distance_today(&self) -> Result<f64, ProviderQueryError>;
}

/// Round a native step value into a count, rejecting values no SDK should produce
pub(crate) fn step_count_from(value: f64) -> Result<u64, ProviderQueryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProviderQueryError::InvalidValue(value));
    }
    Ok(value.round() as u64)
}
