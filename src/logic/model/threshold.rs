//! Detection Rule
//!
//! Decides whether a prediction counts as an alarm detection.

use serde::{Deserialize, Serialize};

use super::knn::PredictionResult;
use crate::constants::{DEFAULT_ALARM_LABEL, TOUCH_CONFIDENCE};

/// Alarm label plus the confidence it must exceed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub alarm_label: String,

    /// Exclusive lower bound (0.0 - 1.0)
    pub min_confidence: f32,
}

impl Default for DetectionRule {
    fn default() -> Self {
        Self {
            alarm_label: DEFAULT_ALARM_LABEL.to_string(),
            min_confidence: TOUCH_CONFIDENCE,
        }
    }
}

impl DetectionRule {
    pub fn new(alarm_label: impl Into<String>, min_confidence: f32) -> Self {
        Self {
            alarm_label: alarm_label.into(),
            min_confidence,
        }
    }

    /// Top label is the alarm label and its confidence exceeds the threshold
    pub fn is_alarm(&self, prediction: &PredictionResult) -> bool {
        prediction.label == self.alarm_label && prediction.confidence > self.min_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::knn::LabelScore;

    fn prediction(label: &str, confidence: f32) -> PredictionResult {
        PredictionResult {
            label: label.to_string(),
            confidence,
            scores: vec![LabelScore {
                label: label.to_string(),
                distance: 0.0,
                confidence,
            }],
        }
    }

    #[test]
    fn test_default_rule() {
        let rule = DetectionRule::default();
        assert_eq!(rule.alarm_label, "touched");
        assert_eq!(rule.min_confidence, 0.8);
    }

    #[test]
    fn test_alarm_requires_label_and_confidence() {
        let rule = DetectionRule::new("touched", 0.8);
        assert!(rule.is_alarm(&prediction("touched", 0.95)));
        assert!(!rule.is_alarm(&prediction("touched", 0.6)));
        assert!(!rule.is_alarm(&prediction("not_touch", 0.99)));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let rule = DetectionRule::new("touched", 0.8);
        assert!(!rule.is_alarm(&prediction("touched", 0.8)));
    }
}
