//! Monitor Commands - API for the CLI or any other front end
//!
//! `Monitor` wires the store, training controller, inference loop and alert
//! debouncer together and exposes the three user-facing operations:
//! train a label, run the loop, read the detection flag.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::engine_status::{ModelStatus, MonitorStatus};
use crate::constants::{APP_NAME, APP_VERSION};
use crate::error::{GuardError, GuardResult};
use crate::logic::analysis_loop::{InferenceLoop, LoopHandle, LoopState};
use crate::logic::capture::{Embedder, FrameSource};
use crate::logic::config::MonitorConfig;
use crate::logic::events::{DetectionEvent, DetectionSignal, Listener};
use crate::logic::model::{DetectionRule, ExampleStore, SharedStore};
use crate::logic::response::{AlertDebouncer, AlertMessage, Notifier, SoundPlayer};
use crate::logic::training::{TrainingController, TrainingReport};

pub struct Monitor {
    config: MonitorConfig,
    store: SharedStore,
    trainer: TrainingController,
    debouncer: Arc<AlertDebouncer>,
    signal: Arc<DetectionSignal>,
    inference: Arc<InferenceLoop>,
    /// Serialises `train` calls
    training_lock: Mutex<()>,
    running: Mutex<Option<LoopHandle>>,
}

impl Monitor {
    /// Wire up the monitor.
    ///
    /// Probes the camera once; a source that cannot deliver a frame fails
    /// with `CameraUnavailable` and nothing is started.
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn FrameSource>,
        embedder: Arc<dyn Embedder>,
        sound: Arc<dyn SoundPlayer>,
        notifier: Arc<dyn Notifier>,
    ) -> GuardResult<Self> {
        config.validate()?;

        let probe = source
            .acquire_frame()
            .map_err(|e| GuardError::CameraUnavailable(e.to_string()))?;
        let dimension = embedder.embed(&probe)?.len();
        log::info!(
            "Camera ready ({}x{}), embedding dimension {}",
            probe.width,
            probe.height,
            dimension
        );

        let store: SharedStore = Arc::new(RwLock::new(ExampleStore::new()));
        let signal = Arc::new(DetectionSignal::default());
        let debouncer = Arc::new(AlertDebouncer::new(
            sound,
            notifier,
            AlertMessage {
                title: config.notification_title.clone(),
                body: config.notification_body.clone(),
            },
        ));

        let trainer = TrainingController::new(
            store.clone(),
            source.clone(),
            embedder.clone(),
            config.capture_interval(),
        );

        let inference = Arc::new(InferenceLoop::new(
            store.clone(),
            source,
            embedder,
            debouncer.clone(),
            signal.clone(),
            DetectionRule::new(config.alarm_label.clone(), config.confidence_threshold),
            config.poll_interval(),
        ));

        log::info!("Setup done");
        log::info!(
            "Train '{}' first, then '{}', then run",
            config.safe_label,
            config.alarm_label
        );

        Ok(Self {
            config,
            store,
            trainer,
            debouncer,
            signal,
            inference,
            training_lock: Mutex::new(()),
            running: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    // ------------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------------

    /// Train `label` with the configured number of captures
    pub fn train(&self, label: &str) -> GuardResult<TrainingReport> {
        self.train_count(label, self.config.training_captures)
    }

    pub fn train_count(&self, label: &str, count: usize) -> GuardResult<TrainingReport> {
        self.train_with_progress(label, count, |_, _| {})
    }

    pub fn train_with_progress<F>(
        &self,
        label: &str,
        count: usize,
        progress: F,
    ) -> GuardResult<TrainingReport>
    where
        F: FnMut(usize, usize),
    {
        let _guard = self.training_lock.lock();

        let safe_count = self.store.read().example_count(&self.config.safe_label);
        if label == self.config.alarm_label && safe_count == 0 {
            log::warn!(
                "Training '{}' before '{}'; everything may look like an alarm",
                label,
                self.config.safe_label
            );
        }

        self.trainer.train_with_progress(label, count, progress)
    }

    // ------------------------------------------------------------------------
    // Inference
    // ------------------------------------------------------------------------

    /// Start the inference loop in the background.
    ///
    /// If the previous run already died, its error is returned once and
    /// nothing is started; the next call starts normally.
    pub fn run(&self) -> GuardResult<()> {
        let mut running = self.running.lock();
        Self::reap(&mut running)?;
        *running = Some(self.inference.start()?);
        Ok(())
    }

    /// Join a finished background run, handing back how it ended
    fn reap(running: &mut Option<LoopHandle>) -> GuardResult<()> {
        match running.take() {
            Some(previous) if previous.is_finished() => previous.join().map(|_| ()),
            Some(previous) => {
                *running = Some(previous);
                Err(GuardError::AlreadyRunning)
            }
            None => Ok(()),
        }
    }

    /// Stop the loop and wait for its current cycle.
    ///
    /// Returns the cycles run, or the error that had already stopped it.
    pub fn stop(&self) -> GuardResult<u64> {
        let handle = self.running.lock().take();
        match handle {
            Some(handle) => {
                handle.stop();
                handle.join()
            }
            None => Ok(0),
        }
    }

    /// Run exactly `cycles` cycles on the calling thread
    pub fn run_cycles(&self, cycles: u64) -> GuardResult<u64> {
        Self::reap(&mut self.running.lock())?;
        self.inference.run(Some(cycles))
    }

    pub fn loop_state(&self) -> LoopState {
        self.inference.state()
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Current detection flag
    pub fn is_detected(&self) -> bool {
        self.signal.is_detected()
    }

    pub fn subscribe(&self, listener: Listener) {
        self.signal.subscribe(listener);
    }

    pub fn recent_events(&self, limit: usize) -> Vec<DetectionEvent> {
        self.signal.recent(limit)
    }

    /// Forward a completion signal from an external sound system
    pub fn on_sound_finished(&self) {
        self.debouncer.on_sound_finished();
    }

    pub fn status(&self) -> MonitorStatus {
        let store = self.store.read();
        MonitorStatus {
            app: APP_NAME.to_string(),
            version: APP_VERSION.to_string(),
            loop_state: self.inference.state(),
            detected: self.signal.is_detected(),
            last_event: self.signal.last(),
            last_error: self.inference.last_error(),
            model: ModelStatus {
                safe_label: self.config.safe_label.clone(),
                alarm_label: self.config.alarm_label.clone(),
                threshold: self.inference.rule().min_confidence,
                dimension: store.dimension(),
                total_examples: store.len(),
                classes: store.class_counts(),
            },
            stats: self.inference.stats(),
            alert: self.debouncer.state(),
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(handle) = self.running.get_mut().take() {
            handle.stop();
            let _ = handle.join();
        }
    }
}
