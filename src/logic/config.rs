//! Monitor configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{self, env_parse, env_string};
use crate::error::{GuardError, GuardResult};

/// Runtime configuration for training, inference and alerting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Label trained for the "everything fine" class
    pub safe_label: String,

    /// Label that raises the alarm
    pub alarm_label: String,

    /// Captures per `train` call
    pub training_captures: usize,

    /// Pause between training captures (ms)
    pub capture_interval_ms: u64,

    /// Pause between inference cycles (ms)
    pub poll_interval_ms: u64,

    /// Alarm label confidence must exceed this
    pub confidence_threshold: f32,

    /// Minimum gap between two delivered notifications (ms)
    pub notification_cooldown_ms: u64,

    /// Alert sound length (ms)
    pub sound_duration_ms: u64,

    pub notification_title: String,
    pub notification_body: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            safe_label: constants::DEFAULT_SAFE_LABEL.to_string(),
            alarm_label: constants::DEFAULT_ALARM_LABEL.to_string(),
            training_captures: constants::TRAINING_TIMES,
            capture_interval_ms: constants::DEFAULT_CAPTURE_INTERVAL_MS,
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            confidence_threshold: constants::TOUCH_CONFIDENCE,
            notification_cooldown_ms: constants::DEFAULT_NOTIFICATION_COOLDOWN_MS,
            sound_duration_ms: constants::DEFAULT_SOUND_DURATION_MS,
            notification_title: constants::DEFAULT_NOTIFICATION_TITLE.to_string(),
            notification_body: constants::DEFAULT_NOTIFICATION_BODY.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            safe_label: env_string("SAFE_LABEL", &defaults.safe_label),
            alarm_label: env_string("ALARM_LABEL", &defaults.alarm_label),
            training_captures: env_parse("TRAINING_CAPTURES", defaults.training_captures),
            capture_interval_ms: env_parse("CAPTURE_INTERVAL_MS", defaults.capture_interval_ms),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS", defaults.poll_interval_ms),
            confidence_threshold: env_parse("CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
            notification_cooldown_ms: env_parse(
                "NOTIFICATION_COOLDOWN_MS",
                defaults.notification_cooldown_ms,
            ),
            sound_duration_ms: env_parse("SOUND_DURATION_MS", defaults.sound_duration_ms),
            notification_title: env_string("NOTIFICATION_TITLE", &defaults.notification_title),
            notification_body: env_string("NOTIFICATION_BODY", &defaults.notification_body),
        }
    }

    /// Reject settings the monitor cannot work with
    pub fn validate(&self) -> GuardResult<()> {
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            return Err(GuardError::Config(format!(
                "confidence threshold {} must be in [0, 1)",
                self.confidence_threshold
            )));
        }
        if self.training_captures == 0 {
            return Err(GuardError::Config("training captures must be at least 1".into()));
        }
        if self.safe_label.trim().is_empty() || self.alarm_label.trim().is_empty() {
            return Err(GuardError::Config("labels must not be empty".into()));
        }
        if self.safe_label == self.alarm_label {
            return Err(GuardError::Config(format!(
                "safe and alarm labels are both '{}'",
                self.alarm_label
            )));
        }
        Ok(())
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn notification_cooldown(&self) -> Duration {
        Duration::from_millis(self.notification_cooldown_ms)
    }

    pub fn sound_duration(&self) -> Duration {
        Duration::from_millis(self.sound_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.training_captures, 50);
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.notification_cooldown(), Duration::from_millis(3000));
    }

    #[test]
    fn test_validate_rejects_same_labels() {
        let config = MonitorConfig {
            alarm_label: "not_touch".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GuardError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let config = MonitorConfig {
            confidence_threshold: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            confidence_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_captures() {
        let config = MonitorConfig {
            training_captures: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("TOUCH_GUARD_POLL_INTERVAL_MS", "50");
        std::env::set_var("TOUCH_GUARD_ALARM_LABEL", "hand");
        let config = MonitorConfig::from_env();
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.alarm_label, "hand");
        std::env::remove_var("TOUCH_GUARD_POLL_INTERVAL_MS");
        std::env::remove_var("TOUCH_GUARD_ALARM_LABEL");
    }
}
