//! Test doubles for the external collaborators

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::error::{GuardError, GuardResult};
use crate::logic::capture::{Embedder, Frame, FrameSource};
use crate::logic::model::Embedding;
use crate::logic::response::{Notifier, SoundFinished, SoundPlayer};

/// Replays a fixed list of pixel buffers, repeating the last one
pub struct ScriptedSource {
    frames: Mutex<Vec<Vec<f32>>>,
    cursor: AtomicUsize,
    fail_after: Option<usize>,
}

impl ScriptedSource {
    pub fn repeating(frames: Vec<Vec<f32>>) -> Self {
        assert!(!frames.is_empty(), "scripted source needs at least one frame");
        Self {
            frames: Mutex::new(frames),
            cursor: AtomicUsize::new(0),
            fail_after: None,
        }
    }

    /// Captures past the first `n` fail with `Capture`
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Replace what the camera sees from the next capture on
    pub fn show(&self, pixels: Vec<f32>) {
        *self.frames.lock() = vec![pixels];
        self.cursor.store(0, Ordering::SeqCst);
    }

    pub fn captures(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl FrameSource for ScriptedSource {
    fn acquire_frame(&self) -> GuardResult<Frame> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if index >= limit {
                return Err(GuardError::Capture("scripted camera failure".into()));
            }
        }
        let frames = self.frames.lock();
        let pixels = frames[index.min(frames.len() - 1)].clone();
        let len = pixels.len();
        Ok(Frame::new(index as u64, len, 1, pixels))
    }
}

/// Blocks the first capture until `release`; later captures return at once
pub struct GatedSource {
    pixels: Vec<f32>,
    fail_gated: bool,
    calls: AtomicUsize,
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedSource {
    pub fn new(pixels: Vec<f32>) -> Self {
        Self {
            pixels,
            fail_gated: false,
            calls: AtomicUsize::new(0),
            open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    /// The gated capture fails with `Capture` once released
    pub fn failing(mut self) -> Self {
        self.fail_gated = true;
        self
    }

    pub fn wait_until_blocked(&self) {
        while self.calls.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    pub fn release(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }
}

impl FrameSource for GatedSource {
    fn acquire_frame(&self) -> GuardResult<Frame> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if index == 0 {
            let mut open = self.open.lock();
            while !*open {
                self.opened.wait(&mut open);
            }
            drop(open);
            if self.fail_gated {
                return Err(GuardError::Capture("gated camera failure".into()));
            }
        }
        Ok(Frame::new(index as u64, self.pixels.len(), 1, self.pixels.clone()))
    }
}

/// Embedding = raw pixels
pub struct IdentityEmbedder;

impl Embedder for IdentityEmbedder {
    fn embed(&self, frame: &Frame) -> GuardResult<Embedding> {
        Ok(frame.pixels.clone())
    }
}

#[derive(Default)]
pub struct CountingNotifier {
    count: AtomicU64,
}

impl CountingNotifier {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn notify(&self, _title: &str, _body: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Holds completion callbacks until `finish_all` is called
#[derive(Default)]
pub struct ManualSound {
    plays: AtomicU64,
    pending: Mutex<Vec<SoundFinished>>,
}

impl ManualSound {
    pub fn plays(&self) -> u64 {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn finish_all(&self) {
        let pending: Vec<SoundFinished> = std::mem::take(&mut *self.pending.lock());
        for done in pending {
            done();
        }
    }
}

impl SoundPlayer for ManualSound {
    fn play(&self, on_finished: SoundFinished) {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().push(on_finished);
    }
}

/// Completes inside `play`
#[derive(Default)]
pub struct InstantSound {
    plays: AtomicU64,
}

impl SoundPlayer for InstantSound {
    fn play(&self, on_finished: SoundFinished) {
        self.plays.fetch_add(1, Ordering::SeqCst);
        on_finished();
    }
}
