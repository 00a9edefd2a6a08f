//! Health adapter settings and configuration management
//!
//! Settings can be serialized to/from JSON and are validated on every load
//! and save. Timeouts are optional; `None` waits on the native SDK forever.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Upper bound on the permission dialog / authorization flow
    pub permission_timeout_ms: Option<u64>,

    /// Upper bound on a single step or distance query
    pub query_timeout_ms: Option<u64>,

    /// Count step samples the user entered by hand (Apple Health only)
    pub include_manually_added_steps: bool,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            permission_timeout_ms: Some(60_000),
            query_timeout_ms: Some(15_000),
            include_manually_added_steps: false,
        }
    }
}

impl HealthSettings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings without any timeout, matching an SDK that is trusted to answer
    pub fn without_timeouts() -> Self {
        Self {
            permission_timeout_ms: None,
            query_timeout_ms: None,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.permission_timeout_ms == Some(0) {
            return Err(SettingsError::ConfigError(
                "permission_timeout_ms must be > 0 when set".to_string(),
            ));
        }

        if self.query_timeout_ms == Some(0) {
            return Err(SettingsError::ConfigError(
                "query_timeout_ms must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn permission_timeout(&self) -> Option<Duration> {
        self.permission_timeout_ms.map(Duration::from_millis)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Load settings from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_string(&content)
    }

    /// Save settings to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Convert to pretty JSON string
    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create from JSON string
    pub fn from_json_string(json: &str) -> Result<Self, SettingsError> {
        let settings: HealthSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        fn ms(value: Option<u64>) -> String {
            value.map_or_else(|| "none".to_string(), |v| format!("{}ms", v))
        }

        format!(
            "HealthSettings {{ permission_timeout: {}, query_timeout: {}, manual_steps: {} }}",
            ms(self.permission_timeout_ms),
            ms(self.query_timeout_ms),
            self.include_manually_added_steps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let settings = HealthSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.permission_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(settings.query_timeout(), Some(Duration::from_secs(15)));
        assert!(!settings.include_manually_added_steps);
    }

    #[test]
    fn test_without_timeouts() {
        let settings = HealthSettings::without_timeouts();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.permission_timeout(), None);
        assert_eq!(settings.query_timeout(), None);
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut settings = HealthSettings::default();
        settings.permission_timeout_ms = Some(0);
        assert!(settings.validate().is_err());

        let mut settings = HealthSettings::default();
        settings.query_timeout_ms = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut original = HealthSettings::default();
        original.include_manually_added_steps = true;
        original.query_timeout_ms = None;

        let json = original.to_json_string().unwrap();
        let parsed = HealthSettings::from_json_string(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "include_manually_added_steps": true }"#;
        let parsed = HealthSettings::from_json_string(json).unwrap();
        assert!(parsed.include_manually_added_steps);
        assert_eq!(parsed.permission_timeout_ms, Some(60_000));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            HealthSettings::from_json_string("{ not json"),
            Err(SettingsError::JsonError(_))
        ));
        assert!(matches!(
            HealthSettings::from_json_string(r#"{ "query_timeout_ms": 0 }"#),
            Err(SettingsError::ConfigError(_))
        ));
    }

    #[test]
    fn test_summary() {
        let summary = HealthSettings::without_timeouts().summary();
        assert!(summary.contains("permission_timeout: none"));
        assert!(summary.contains("manual_steps: false"));
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("health_settings.json");

        let mut original = HealthSettings::default();
        original.permission_timeout_ms = Some(5_000);
        original.save(&file_path).unwrap();

        let loaded = HealthSettings::load(&file_path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_file_load_nonexistent_fails() {
        let result = HealthSettings::load("/nonexistent/path/health_settings.json");
        assert!(matches!(result, Err(SettingsError::IoError(_))));
    }

    #[test]
    fn test_file_save_with_invalid_settings_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("health_settings.json");

        let mut settings = HealthSettings::default();
        settings.query_timeout_ms = Some(0);

        assert!(settings.save(&file_path).is_err());
        assert!(!file_path.exists());
    }
}
