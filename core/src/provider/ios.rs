//! Apple Health provider
//!
//! Native code implements [`AppleHealthStore`] over the HealthKit SDK. The
//! provider owns the request shape (permissions, query options) and the
//! normalization of what comes back.

use super::{step_count_from, HealthProvider, InitError, NativeError, ProviderQueryError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// HealthKit read permission for step samples
pub const STEP_COUNT_PERMISSION: &str = "StepCount";
/// HealthKit read permission for walking + running distance samples
pub const DISTANCE_WALKING_RUNNING_PERMISSION: &str = "DistanceWalkingRunning";

// ============================================================================
// NATIVE REQUEST/RESPONSE TYPES
// ============================================================================

/// Read/write permission sets passed to HealthKit initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthKitPermissions {
    pub read: Vec<String>,
    pub write: Vec<String>,
}

impl HealthKitPermissions {
    /// Read access to step count and walking distance, no write access
    pub fn steps_and_distance() -> Self {
        Self {
            read: vec![
                STEP_COUNT_PERMISSION.to_string(),
                DISTANCE_WALKING_RUNNING_PERMISSION.to_string(),
            ],
            write: Vec::new(),
        }
    }
}

impl Default for HealthKitPermissions {
    fn default() -> Self {
        Self::steps_and_distance()
    }
}

/// Unit HealthKit should report distance in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Mile,
    Meter,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mile => "mile",
            Self::Meter => "meter",
        }
    }
}

/// Options for the daily step count query
#[derive(Debug, Clone, PartialEq)]
pub struct StepCountOptions {
    /// Any instant within the day to count
    pub date: DateTime<Local>,
    pub include_manually_added: bool,
}

/// Options for the daily walking distance query
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceOptions {
    pub date: DateTime<Local>,
    pub unit: DistanceUnit,
}

/// Single aggregated value returned by HealthKit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthValue {
    pub value: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl HealthValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            start_date: None,
            end_date: None,
        }
    }
}

// ============================================================================
// NATIVE BINDING TRAIT
// ============================================================================

/// HealthKit SDK surface used by [`IosProvider`]
#[async_trait]
pub trait AppleHealthStore: Send + Sync {
    async fn init_health_kit(&self, permissions: &HealthKitPermissions) -> Result<(), NativeError>;

    async fn get_step_count(&self, options: &StepCountOptions) -> Result<HealthValue, NativeError>;

    async fn get_distance_walking_running(
        &self,
        options: &DistanceOptions,
    ) -> Result<HealthValue, NativeError>;
}

// ============================================================================
// PROVIDER
// ============================================================================

pub struct IosProvider {
    store: Arc<dyn AppleHealthStore>,
    permissions: HealthKitPermissions,
    include_manually_added: bool,
}

impl IosProvider {
    pub fn new(store: Arc<dyn AppleHealthStore>) -> Self {
        Self {
            store,
            permissions: HealthKitPermissions::steps_and_distance(),
            include_manually_added: false,
        }
    }

    /// Count step samples the user typed in by hand
    pub fn with_manually_added(mut self, include: bool) -> Self {
        self.include_manually_added = include;
        self
    }

    pub fn permissions(&self) -> &HealthKitPermissions {
        &self.permissions
    }
}

#[async_trait]
impl HealthProvider for IosProvider {
    fn name(&self) -> &'static str {
        "apple-health"
    }

    async fn request_permissions(&self) -> Result<(), InitError> {
        info!("Requesting HealthKit permissions: {:?}", self.permissions.read);

        match self.store.init_health_kit(&self.permissions).await {
            Ok(()) => {
                info!("HealthKit has permissions");
                Ok(())
            }
            Err(e) => {
                error!("Cannot grant HealthKit permissions: {}", e);
                Err(e.into())
            }
        }
    }

    async fn steps_today(&self) -> Result<u64, ProviderQueryError> {
        let options = StepCountOptions {
            date: Local::now(),
            include_manually_added: self.include_manually_added,
        };

        let result = self.store.get_step_count(&options).await?;
        debug!("HealthKit step count: {:?}", result);
        step_count_from(result.value)
    }

    async fn distance_today(&self) -> Result<f64, ProviderQueryError> {
        let options = DistanceOptions {
            date: Local::now(),
            unit: DistanceUnit::Mile,
        };

        let result = self.store.get_distance_walking_running(&options).await?;
        debug!("HealthKit walking distance: {} mi", result.value);

        if !result.value.is_finite() || result.value < 0.0 {
            return Err(ProviderQueryError::InvalidValue(result.value));
        }
        Ok(result.value)
    }
}
