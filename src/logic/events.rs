//! Detection Signal - observable detection flag
//!
//! The inference loop publishes one event per cycle. Presentation layers
//! read the current flag or subscribe to events.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_EVENT_HISTORY;
use crate::logic::response::AlertDecision;

/// Event names
pub mod events {
    /// Every completed cycle
    pub const DETECTION_CYCLE: &str = "detection:cycle";
    /// Detection flag flipped
    pub const DETECTION_CHANGED: &str = "detection:changed";
    /// Sound + notification went out
    pub const ALERT_DISPATCHED: &str = "alert:dispatched";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub cycle: u64,
    pub detected: bool,
    /// None when the store was empty
    pub label: Option<String>,
    pub confidence: Option<f32>,
    pub decision: AlertDecision,
    pub timestamp: DateTime<Utc>,
}

/// Listener receives (event name, payload).
///
/// Listeners run on the publishing thread and must not subscribe from
/// inside the callback.
pub type Listener = Box<dyn Fn(&str, &DetectionEvent) + Send + Sync>;

pub struct DetectionSignal {
    flag: AtomicBool,
    listeners: RwLock<Vec<Listener>>,
    history: RwLock<VecDeque<DetectionEvent>>,
    max_history: usize,
}

impl Default for DetectionSignal {
    fn default() -> Self {
        Self::new(MAX_EVENT_HISTORY)
    }
}

impl DetectionSignal {
    pub fn new(max_history: usize) -> Self {
        Self {
            flag: AtomicBool::new(false),
            listeners: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::with_capacity(max_history)),
            max_history,
        }
    }

    /// Current detection flag
    pub fn is_detected(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self, listener: Listener) {
        self.listeners.write().push(listener);
    }

    /// Record a cycle result and notify listeners
    pub fn publish(&self, event: DetectionEvent) {
        let previous = self.flag.swap(event.detected, Ordering::SeqCst);

        {
            let mut history = self.history.write();
            if self.max_history > 0 {
                if history.len() >= self.max_history {
                    history.pop_front();
                }
                history.push_back(event.clone());
            }
        }

        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener(events::DETECTION_CYCLE, &event);
            if previous != event.detected {
                listener(events::DETECTION_CHANGED, &event);
            }
            if event.decision == AlertDecision::Dispatched {
                listener(events::ALERT_DISPATCHED, &event);
            }
        }
    }

    /// Force the flag down without an event (loop stopped)
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn last(&self) -> Option<DetectionEvent> {
        self.history.read().back().cloned()
    }

    /// Up to `limit` most recent events, oldest first
    pub fn recent(&self, limit: usize) -> Vec<DetectionEvent> {
        let history = self.history.read();
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }
}
