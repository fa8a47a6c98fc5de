//! Response Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_NOTIFICATION_BODY, DEFAULT_NOTIFICATION_TITLE};

// ============================================================================
// ALERT STATE
// ============================================================================

/// Whether the last cycle saw an alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertPhase {
    #[default]
    Quiet,
    Alarmed,
}

impl AlertPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPhase::Quiet => "quiet",
            AlertPhase::Alarmed => "alarmed",
        }
    }
}

/// Debouncer state.
///
/// `can_play_sound` is cleared when an alert is dispatched and set again
/// only when the sound reports completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub phase: AlertPhase,
    pub can_play_sound: bool,
    pub last_notification_at: Option<DateTime<Utc>>,
    /// Sound + notification pairs sent
    pub alerts_dispatched: u64,
    /// Alarm cycles swallowed while a sound was playing
    pub alerts_suppressed: u64,
}

impl Default for AlertState {
    fn default() -> Self {
        Self {
            phase: AlertPhase::Quiet,
            can_play_sound: true,
            last_notification_at: None,
            alerts_dispatched: 0,
            alerts_suppressed: 0,
        }
    }
}

/// What `on_detection` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertDecision {
    /// Sound and notification sent
    Dispatched,
    /// Alarm seen but an alert is already playing
    Suppressed,
    /// No alarm
    Quiet,
}

// ============================================================================
// ALERT MESSAGE
// ============================================================================

/// Notification text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
}

impl Default for AlertMessage {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            body: DEFAULT_NOTIFICATION_BODY.to_string(),
        }
    }
}
