//! Alert sound playback

use std::io::Write;
use std::thread;
use std::time::Duration;

/// Called once when playback ends
pub type SoundFinished = Box<dyn FnOnce() + Send + 'static>;

/// Fire-and-forget sound playback with a completion callback.
///
/// `play` must not block for the length of the sound. The callback may be
/// invoked from any thread, including synchronously from inside `play`.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, on_finished: SoundFinished);
}

/// Rings the terminal bell and reports completion after a fixed duration
#[derive(Debug, Clone)]
pub struct TerminalBell {
    duration: Duration,
}

impl TerminalBell {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl SoundPlayer for TerminalBell {
    fn play(&self, on_finished: SoundFinished) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            log::debug!("Terminal bell failed: {}", e);
        }
        log::info!("Alert sound playing ({} ms)", self.duration.as_millis());

        let duration = self.duration;
        thread::spawn(move || {
            thread::sleep(duration);
            log::debug!("Alert sound finished");
            on_finished();
        });
    }
}
