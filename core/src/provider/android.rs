//! Google Fit provider
//!
//! Native code implements [`GoogleFitClient`] over the Google Fit SDK.
//! Google Fit reports distance in meters and returns steps grouped by data
//! source, so this provider picks the estimated-steps stream and converts
//! distance to miles.

use super::{step_count_from, HealthProvider, InitError, NativeError, ProviderQueryError};
use crate::units::{meters_to_miles, DayRange};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Data source Google Fit uses for its merged, de-duplicated step estimate
pub const ESTIMATED_STEPS_SOURCE: &str = "com.google.android.gms:estimated_steps";

// ============================================================================
// NATIVE REQUEST/RESPONSE TYPES
// ============================================================================

/// OAuth scopes requested during authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessScope {
    ActivityRead,
    ActivityWrite,
    LocationRead,
}

impl FitnessScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActivityRead => "https://www.googleapis.com/auth/fitness.activity.read",
            Self::ActivityWrite => "https://www.googleapis.com/auth/fitness.activity.write",
            Self::LocationRead => "https://www.googleapis.com/auth/fitness.location.read",
        }
    }

    /// Scopes needed for daily steps and distance
    pub fn defaults() -> Vec<FitnessScope> {
        vec![Self::ActivityRead, Self::ActivityWrite, Self::LocationRead]
    }
}

/// Outcome of the Google sign-in/authorization flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeResult {
    pub success: bool,
    pub message: Option<String>,
}

/// One day's step total from a single data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    pub date: String,
    pub value: f64,
}

/// Step samples grouped by the data source that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSourceBucket {
    pub source: String,
    pub steps: Vec<StepSample>,
}

/// Distance bucket; `distance` is in meters and absent when nothing was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub distance: Option<f64>,
    pub start_date: String,
    pub end_date: String,
}

// ============================================================================
// NATIVE BINDING TRAIT
// ============================================================================

/// Google Fit SDK surface used by [`AndroidProvider`]
#[async_trait]
pub trait GoogleFitClient: Send + Sync {
    async fn authorize(&self, scopes: &[FitnessScope]) -> Result<AuthorizeResult, NativeError>;

    async fn get_daily_steps(&self) -> Result<Vec<StepSourceBucket>, NativeError>;

    async fn get_daily_distance_samples(
        &self,
        range: &DayRange,
    ) -> Result<Vec<DistanceSample>, NativeError>;
}

// ============================================================================
// PROVIDER
// ============================================================================

pub struct AndroidProvider {
    client: Arc<dyn GoogleFitClient>,
    scopes: Vec<FitnessScope>,
}

impl AndroidProvider {
    pub fn new(client: Arc<dyn GoogleFitClient>) -> Self {
        Self {
            client,
            scopes: FitnessScope::defaults(),
        }
    }

    pub fn scopes(&self) -> &[FitnessScope] {
        &self.scopes
    }
}

#[async_trait]
impl HealthProvider for AndroidProvider {
    fn name(&self) -> &'static str {
        "google-fit"
    }

    async fn request_permissions(&self) -> Result<(), InitError> {
        let outcome = match self.client.authorize(&self.scopes).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Google Fit authorization error: {}", e);
                return Err(e.into());
            }
        };

        if outcome.success {
            info!("Google Fit authorization succeeded");
            return Ok(());
        }

        let message = outcome.message.unwrap_or_default();
        warn!("Google Fit authorization denied: {}", message);
        Err(InitError::PermissionDenied(if message.is_empty() {
            "AUTH_DENIED".to_string()
        } else {
            format!("AUTH_DENIED: {}", message)
        }))
    }

    async fn steps_today(&self) -> Result<u64, ProviderQueryError> {
        let buckets = self.client.get_daily_steps().await?;

        let estimated = buckets
            .iter()
            .find(|bucket| bucket.source == ESTIMATED_STEPS_SOURCE)
            .ok_or_else(|| {
                ProviderQueryError::MissingData(format!("no {} bucket", ESTIMATED_STEPS_SOURCE))
            })?;

        match estimated.steps.first() {
            Some(sample) => {
                debug!("Google Fit steps for {}: {}", sample.date, sample.value);
                step_count_from(sample.value)
            }
            None => Ok(0),
        }
    }

    async fn distance_today(&self) -> Result<f64, ProviderQueryError> {
        let range = DayRange::today();
        let samples = self.client.get_daily_distance_samples(&range).await?;

        let meters = match samples.first().and_then(|sample| sample.distance) {
            Some(meters) => meters,
            None => return Ok(0.0),
        };

        if !meters.is_finite() || meters < 0.0 {
            return Err(ProviderQueryError::InvalidValue(meters));
        }

        debug!("Google Fit distance: {} m", meters);
        Ok(meters_to_miles(meters))
    }
}
