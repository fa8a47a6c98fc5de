//! Inference Loop
//!
//! Polling cycle: acquire frame -> embed -> classify -> alert -> pause.
//!
//! States: `Idle -> Polling -> Stopped`, and `Stopped -> Polling` again on a
//! fresh start. `stop()` is cooperative: a cycle that already began runs to
//! completion, and no new cycle begins afterwards.
//!
//! An empty store skips classification for the cycle. Any other failure
//! inside a cycle stops the loop and is handed back to the caller.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};
use crate::logic::capture::{Embedder, FrameSource};
use crate::logic::events::{DetectionEvent, DetectionSignal};
use crate::logic::model::{predict, DetectionRule, PredictionResult, SharedStore};
use crate::logic::response::{AlertDebouncer, AlertDecision};

/// Longest uninterrupted sleep while pausing between cycles
const PAUSE_SLICE: Duration = Duration::from_millis(20);

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    Idle,
    Polling,
    Stopped,
}

impl LoopState {
    fn as_u8(self) -> u8 {
        match self {
            LoopState::Idle => 0,
            LoopState::Polling => 1,
            LoopState::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoopState::Idle,
            1 => LoopState::Polling,
            _ => LoopState::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Idle => "idle",
            LoopState::Polling => "polling",
            LoopState::Stopped => "stopped",
        }
    }
}

/// Result of one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub detected: bool,
    /// None when the store had nothing to classify against
    pub prediction: Option<PredictionResult>,
    pub decision: AlertDecision,
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Default)]
struct LoopStats {
    cycles: AtomicU64,
    detections: AtomicU64,
    alerts_dispatched: AtomicU64,
    empty_cycles: AtomicU64,
    latency_sum_us: AtomicU64,
}

/// Loop counters for status output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopStatsSnapshot {
    pub cycles: u64,
    pub detections: u64,
    pub alerts_dispatched: u64,
    /// Cycles skipped because the store was empty
    pub empty_cycles: u64,
    pub avg_cycle_ms: f32,
}

impl LoopStats {
    fn snapshot(&self) -> LoopStatsSnapshot {
        let cycles = self.cycles.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        LoopStatsSnapshot {
            cycles,
            detections: self.detections.load(Ordering::Relaxed),
            alerts_dispatched: self.alerts_dispatched.load(Ordering::Relaxed),
            empty_cycles: self.empty_cycles.load(Ordering::Relaxed),
            avg_cycle_ms: if cycles > 0 {
                (sum as f32 / cycles as f32) / 1000.0
            } else {
                0.0
            },
        }
    }
}

// ============================================================================
// INFERENCE LOOP
// ============================================================================

pub struct InferenceLoop {
    store: SharedStore,
    source: Arc<dyn FrameSource>,
    embedder: Arc<dyn Embedder>,
    debouncer: Arc<AlertDebouncer>,
    signal: Arc<DetectionSignal>,
    rule: DetectionRule,
    poll_interval: Duration,
    state: AtomicU8,
    generation: AtomicU64,
    stats: LoopStats,
    last_error: Mutex<Option<String>>,
    /// Serialises run start and run teardown
    transition: Mutex<()>,
}

impl InferenceLoop {
    pub fn new(
        store: SharedStore,
        source: Arc<dyn FrameSource>,
        embedder: Arc<dyn Embedder>,
        debouncer: Arc<AlertDebouncer>,
        signal: Arc<DetectionSignal>,
        rule: DetectionRule,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            source,
            embedder,
            debouncer,
            signal,
            rule,
            poll_interval,
            state: AtomicU8::new(LoopState::Idle.as_u8()),
            generation: AtomicU64::new(0),
            stats: LoopStats::default(),
            last_error: Mutex::new(None),
            transition: Mutex::new(()),
        }
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn stats(&self) -> LoopStatsSnapshot {
        self.stats.snapshot()
    }

    /// Message of the failure that last stopped the loop
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn rule(&self) -> &DetectionRule {
        &self.rule
    }

    /// Start polling on a background thread
    pub fn start(self: &Arc<Self>) -> GuardResult<LoopHandle> {
        let generation = self.begin()?;
        let this = Arc::clone(self);
        let thread = thread::spawn(move || this.drive(generation, None));

        Ok(LoopHandle {
            inner: Arc::clone(self),
            thread: Some(thread),
        })
    }

    /// Poll on the calling thread until stopped, failed, or `max_cycles` ran
    pub fn run(&self, max_cycles: Option<u64>) -> GuardResult<u64> {
        let generation = self.begin()?;
        self.drive(generation, max_cycles)
    }

    /// Ask the loop to stop before its next cycle
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(
                LoopState::Polling.as_u8(),
                LoopState::Stopped.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            log::info!("Inference loop stop requested");
            self.signal.clear();
        }
    }

    /// One full cycle without the trailing pause
    pub fn run_cycle(&self) -> GuardResult<CycleOutcome> {
        let started = Instant::now();

        let frame = self.source.acquire_frame()?;
        let embedding = self.embedder.embed(&frame)?;

        let prediction = {
            let store = self.store.read();
            if store.is_empty() {
                None
            } else {
                match predict(&store, &embedding) {
                    Ok(prediction) => Some(prediction),
                    Err(e) if e.is_recoverable() => None,
                    Err(e) => return Err(e),
                }
            }
        };

        let detected = prediction
            .as_ref()
            .map(|p| self.rule.is_alarm(p))
            .unwrap_or(false);

        let decision = self.debouncer.on_detection(detected);

        let cycle = self.stats.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        if prediction.is_none() {
            self.stats.empty_cycles.fetch_add(1, Ordering::Relaxed);
        }
        if detected {
            self.stats.detections.fetch_add(1, Ordering::Relaxed);
        }
        if decision == AlertDecision::Dispatched {
            self.stats.alerts_dispatched.fetch_add(1, Ordering::Relaxed);
        }

        match &prediction {
            Some(p) => log::debug!(
                "Cycle {}: {} ({:.3}) -> {}",
                cycle,
                p.label,
                p.confidence,
                if detected { "Touched" } else { "Not Touch" }
            ),
            None => log::debug!("Cycle {}: store empty, skipping classification", cycle),
        }

        self.signal.publish(DetectionEvent {
            cycle,
            detected,
            label: prediction.as_ref().map(|p| p.label.clone()),
            confidence: prediction.as_ref().map(|p| p.confidence),
            decision,
            timestamp: Utc::now(),
        });

        self.stats
            .latency_sum_us
            .fetch_add(started.elapsed().as_micros() as u64, Ordering::Relaxed);

        Ok(CycleOutcome {
            detected,
            prediction,
            decision,
        })
    }

    // ------------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------------

    /// Idle/Stopped -> Polling; returns the new run's generation
    fn begin(&self) -> GuardResult<u64> {
        let _transition = self.transition.lock();
        let current = self.state.load(Ordering::SeqCst);
        if current == LoopState::Polling.as_u8()
            || self
                .state
                .compare_exchange(
                    current,
                    LoopState::Polling.as_u8(),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_err()
        {
            return Err(GuardError::AlreadyRunning);
        }
        *self.last_error.lock() = None;
        Ok(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state() == LoopState::Polling && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Generation of the most recent `begin`, whatever the state
    fn owns(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn drive(&self, generation: u64, max_cycles: Option<u64>) -> GuardResult<u64> {
        log::info!("Inference loop started (every {} ms)", self.poll_interval.as_millis());
        let reached = |cycles: u64| max_cycles.is_some_and(|max| cycles >= max);
        let mut cycles = 0u64;

        while self.is_current(generation) && !reached(cycles) {
            if let Err(e) = self.run_cycle() {
                self.fail(generation, &e);
                return Err(e);
            }
            cycles += 1;

            if !reached(cycles) {
                self.pause(generation);
            }
        }

        // A cycle in flight during stop() may have raised the flag again
        {
            let _transition = self.transition.lock();
            if self.owns(generation) {
                self.state.store(LoopState::Stopped.as_u8(), Ordering::SeqCst);
                self.signal.clear();
            }
        }
        log::info!("Inference loop stopped after {} cycles", cycles);
        Ok(cycles)
    }

    fn fail(&self, generation: u64, error: &GuardError) {
        log::error!("Inference loop halted: {}", error);
        let _transition = self.transition.lock();
        if !self.owns(generation) {
            return;
        }
        *self.last_error.lock() = Some(error.to_string());
        self.state.store(LoopState::Stopped.as_u8(), Ordering::SeqCst);
        self.signal.clear();
    }

    fn pause(&self, generation: u64) {
        let deadline = Instant::now() + self.poll_interval;
        loop {
            if !self.is_current(generation) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep((deadline - now).min(PAUSE_SLICE));
        }
    }
}

// ============================================================================
// HANDLE
// ============================================================================

/// Owner of a background polling thread
pub struct LoopHandle {
    inner: Arc<InferenceLoop>,
    thread: Option<JoinHandle<GuardResult<u64>>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Wait for the thread; returns cycles run or the error that stopped it
    pub fn join(mut self) -> GuardResult<u64> {
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => Ok(0),
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.inner.stop();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
