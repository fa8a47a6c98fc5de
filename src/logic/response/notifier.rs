//! Desktop notification delivery
//!
//! The debouncer only decides *whether* an alert goes out. Notification
//! channels enforce their own rate limit, which `CooldownNotifier` adds
//! around any `Notifier`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Fire-and-forget notification channel
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        log::warn!("[NOTIFY] {}: {}", title, body);
    }
}

/// Drops notifications arriving within `cooldown` of the last delivered one
pub struct CooldownNotifier<N> {
    inner: N,
    cooldown: Duration,
    last_sent: Mutex<Option<Instant>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl<N: Notifier> CooldownNotifier<N> {
    pub fn new(inner: N, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            last_sent: Mutex::new(None),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

impl<N: Notifier> Notifier for CooldownNotifier<N> {
    fn notify(&self, title: &str, body: &str) {
        {
            let mut last = self.last_sent.lock();
            let now = Instant::now();
            if let Some(at) = *last {
                if now.duration_since(at) < self.cooldown {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Notification '{}' dropped (cooldown)", title);
                    return;
                }
            }
            *last = Some(now);
        }

        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.inner.notify(title, body);
    }
}
