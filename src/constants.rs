//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through a `TOUCH_GUARD_*` environment variable.

/// Label trained while the user is not touching their face
pub const DEFAULT_SAFE_LABEL: &str = "not_touch";

/// Label that raises the alarm
pub const DEFAULT_ALARM_LABEL: &str = "touched";

/// Captures per training round
pub const TRAINING_TIMES: usize = 50;

/// Minimum confidence for the alarm label to count as a detection
pub const TOUCH_CONFIDENCE: f32 = 0.8;

/// Pause between training captures (milliseconds)
pub const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 100;

/// Pause between inference cycles (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Notifier cooldown (milliseconds)
pub const DEFAULT_NOTIFICATION_COOLDOWN_MS: u64 = 3000;

/// Length of the alert sound (milliseconds)
pub const DEFAULT_SOUND_DURATION_MS: u64 = 1200;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Don't touch";
pub const DEFAULT_NOTIFICATION_BODY: &str = "You just touch your face!";

/// Detection events kept in memory for status output
pub const MAX_EVENT_HISTORY: usize = 100;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Touch Guard";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TOUCH_GUARD_";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name)
}

/// Read a string setting from the environment or use the default
pub fn env_string(name: &str, default: &str) -> String {
    std::env::var(env_key(name)).unwrap_or_else(|_| default.to_string())
}

/// Read a parseable setting from the environment or use the default.
///
/// Unparseable values are logged and ignored.
pub fn env_parse<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    let key = env_key(name);
    match std::env::var(&key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
