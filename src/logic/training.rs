//! Training Controller
//!
//! Populates the example store for one label: capture, embed, append,
//! pause, repeat. The pause makes successive captures sample slightly
//! different moments instead of one frame many times.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};
use crate::logic::capture::{Embedder, FrameSource};
use crate::logic::model::SharedStore;

/// Outcome of one `train` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub label: String,
    /// Examples appended by this call
    pub added: usize,
    /// Examples for the label after this call
    pub total: usize,
}

pub struct TrainingController {
    store: SharedStore,
    source: Arc<dyn FrameSource>,
    embedder: Arc<dyn Embedder>,
    capture_interval: Duration,
}

impl TrainingController {
    pub fn new(
        store: SharedStore,
        source: Arc<dyn FrameSource>,
        embedder: Arc<dyn Embedder>,
        capture_interval: Duration,
    ) -> Self {
        Self {
            store,
            source,
            embedder,
            capture_interval,
        }
    }

    /// Capture `count` examples for `label`
    pub fn train(&self, label: &str, count: usize) -> GuardResult<TrainingReport> {
        self.train_with_progress(label, count, |_, _| {})
    }

    /// Same as `train`, calling `progress(done, count)` after every capture.
    ///
    /// Any failure aborts the round with `TrainingAborted`; examples added
    /// before the failure stay in the store.
    pub fn train_with_progress<F>(
        &self,
        label: &str,
        count: usize,
        mut progress: F,
    ) -> GuardResult<TrainingReport>
    where
        F: FnMut(usize, usize),
    {
        log::info!("Training '{}' with {} captures", label, count);

        for i in 0..count {
            if let Err(e) = self.capture_one(label) {
                log::error!("Training '{}' failed at capture {}/{}: {}", label, i + 1, count, e);
                return Err(GuardError::TrainingAborted {
                    label: label.to_string(),
                    added: i,
                    source: Box::new(e),
                });
            }

            log::debug!("Training '{}': {}/{}", label, i + 1, count);
            progress(i + 1, count);

            if i + 1 < count && !self.capture_interval.is_zero() {
                thread::sleep(self.capture_interval);
            }
        }

        let total = self.store.read().example_count(label);
        log::info!("Training '{}' done ({} examples total)", label, total);

        Ok(TrainingReport {
            label: label.to_string(),
            added: count,
            total,
        })
    }

    fn capture_one(&self, label: &str) -> GuardResult<()> {
        let frame = self.source.acquire_frame()?;
        let embedding = self.embedder.embed(&frame)?;
        // Write lock held only for the append
        self.store.write().add_example(embedding, label)
    }
}
