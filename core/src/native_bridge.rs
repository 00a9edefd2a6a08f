// Native SDK callback interfaces
//
// Swift implements AppleHealthSource over HealthKit, Kotlin implements
// GoogleFitSource over Google Fit. Both are blocking from Rust's point of
// view; the wrappers below move each call onto tokio's blocking pool so the
// core sees ordinary async providers.

use async_trait::async_trait;
use crate::provider::{android, ios};
use crate::DayRange;
use std::sync::Arc;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("denied: {reason}")]
    Denied { reason: String },
    #[error("failed: {reason}")]
    Failed { reason: String },
    #[error("unexpected: {reason}")]
    Unexpected { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SourceError {
    fn from(err: uniffi::UnexpectedUniFFICallbackError) -> Self {
        SourceError::Unexpected { reason: err.reason }
    }
}

impl From<SourceError> for crate::NativeError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Denied { reason } => crate::NativeError::Denied(reason),
            SourceError::Failed { reason } | SourceError::Unexpected { reason } => {
                crate::NativeError::Failed(reason)
            }
        }
    }
}

// ============================================================================
// APPLE HEALTH
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HealthValue {
    pub value: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCountQuery {
    /// RFC 3339 instant within the day to count
    pub date: String,
    pub include_manually_added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceQuery {
    pub date: String,
    /// HealthKit unit name, e.g. "mile"
    pub unit: String,
}

pub trait AppleHealthSource: Send + Sync {
    fn init_health_kit(&self, read: Vec<String>, write: Vec<String>) -> Result<(), SourceError>;
    fn get_step_count(&self, query: StepCountQuery) -> Result<HealthValue, SourceError>;
    fn get_distance_walking_running(&self, query: DistanceQuery)
        -> Result<HealthValue, SourceError>;
}

impl From<HealthValue> for ios::HealthValue {
    fn from(value: HealthValue) -> Self {
        ios::HealthValue {
            value: value.value,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

/// Core [`ios::AppleHealthStore`] backed by a foreign [`AppleHealthSource`]
pub(crate) struct ForeignAppleStore {
    source: Arc<dyn AppleHealthSource>,
}

impl ForeignAppleStore {
    pub(crate) fn new(source: Box<dyn AppleHealthSource>) -> Self {
        Self {
            source: Arc::from(source),
        }
    }
}

#[async_trait]
impl ios::AppleHealthStore for ForeignAppleStore {
    async fn init_health_kit(
        &self,
        permissions: &ios::HealthKitPermissions,
    ) -> Result<(), crate::NativeError> {
        let source = self.source.clone();
        let (read, write) = (permissions.read.clone(), permissions.write.clone());
        run_blocking(move || source.init_health_kit(read, write)).await
    }

    async fn get_step_count(
        &self,
        options: &ios::StepCountOptions,
    ) -> Result<ios::HealthValue, crate::NativeError> {
        let source = self.source.clone();
        let query = StepCountQuery {
            date: options.date.to_rfc3339(),
            include_manually_added: options.include_manually_added,
        };
        run_blocking(move || source.get_step_count(query))
            .await
            .map(Into::into)
    }

    async fn get_distance_walking_running(
        &self,
        options: &ios::DistanceOptions,
    ) -> Result<ios::HealthValue, crate::NativeError> {
        let source = self.source.clone();
        let query = DistanceQuery {
            date: options.date.to_rfc3339(),
            unit: options.unit.as_str().to_string(),
        };
        run_blocking(move || source.get_distance_walking_running(query))
            .await
            .map(Into::into)
    }
}

// ============================================================================
// GOOGLE FIT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeOutcome {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSample {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSourceBucket {
    pub source: String,
    pub steps: Vec<StepSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceSample {
    /// Meters
    pub distance: Option<f64>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    pub start_date: String,
    pub end_date: String,
}

pub trait GoogleFitSource: Send + Sync {
    fn authorize(&self, scopes: Vec<String>) -> Result<AuthorizeOutcome, SourceError>;
    fn get_daily_steps(&self) -> Result<Vec<StepSourceBucket>, SourceError>;
    fn get_daily_distance_samples(
        &self,
        window: DayWindow,
    ) -> Result<Vec<DistanceSample>, SourceError>;
}

impl From<StepSourceBucket> for android::StepSourceBucket {
    fn from(bucket: StepSourceBucket) -> Self {
        android::StepSourceBucket {
            source: bucket.source,
            steps: bucket
                .steps
                .into_iter()
                .map(|sample| android::StepSample {
                    date: sample.date,
                    value: sample.value,
                })
                .collect(),
        }
    }
}

impl From<DistanceSample> for android::DistanceSample {
    fn from(sample: DistanceSample) -> Self {
        android::DistanceSample {
            distance: sample.distance,
            start_date: sample.start_date,
            end_date: sample.end_date,
        }
    }
}

/// Core [`android::GoogleFitClient`] backed by a foreign [`GoogleFitSource`]
pub(crate) struct ForeignGoogleFit {
    source: Arc<dyn GoogleFitSource>,
}

impl ForeignGoogleFit {
    pub(crate) fn new(source: Box<dyn GoogleFitSource>) -> Self {
        Self {
            source: Arc::from(source),
        }
    }
}

#[async_trait]
impl android::GoogleFitClient for ForeignGoogleFit {
    async fn authorize(
        &self,
        scopes: &[android::FitnessScope],
    ) -> Result<android::AuthorizeResult, crate::NativeError> {
        let source = self.source.clone();
        let scopes: Vec<String> = scopes.iter().map(|s| s.as_str().to_string()).collect();
        let outcome = run_blocking(move || source.authorize(scopes)).await?;
        Ok(android::AuthorizeResult {
            success: outcome.success,
            message: outcome.message,
        })
    }

    async fn get_daily_steps(
        &self,
    ) -> Result<Vec<android::StepSourceBucket>, crate::NativeError> {
        let source = self.source.clone();
        let buckets = run_blocking(move || source.get_daily_steps()).await?;
        Ok(buckets.into_iter().map(Into::into).collect())
    }

    async fn get_daily_distance_samples(
        &self,
        range: &DayRange,
    ) -> Result<Vec<android::DistanceSample>, crate::NativeError> {
        let source = self.source.clone();
        let (start_date, end_date) = range.to_rfc3339();
        let window = DayWindow {
            start_date,
            end_date,
        };
        let samples = run_blocking(move || source.get_daily_distance_samples(window)).await?;
        Ok(samples.into_iter().map(Into::into).collect())
    }
}

/// Run a blocking foreign call on tokio's blocking pool
async fn run_blocking<T, F>(call: F) -> Result<T, crate::NativeError>
where
    F: FnOnce() -> Result<T, SourceError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result.map_err(Into::into),
        Err(e) => Err(crate::NativeError::Failed(format!(
            "native call aborted: {}",
            e
        ))),
    }
}
