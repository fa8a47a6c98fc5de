//! Alert Debouncer
//!
//! Edge-triggered alerting: one sound + notification per bout of alarm
//! detections. A bout ends when the sound finishes playing, not when the
//! detections stop.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use super::notifier::Notifier;
use super::sound::SoundPlayer;
use super::types::{AlertDecision, AlertMessage, AlertPhase, AlertState};

pub struct AlertDebouncer {
    state: Arc<Mutex<AlertState>>,
    sound: Arc<dyn SoundPlayer>,
    notifier: Arc<dyn Notifier>,
    message: AlertMessage,
}

impl AlertDebouncer {
    pub fn new(
        sound: Arc<dyn SoundPlayer>,
        notifier: Arc<dyn Notifier>,
        message: AlertMessage,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(AlertState::default())),
            sound,
            notifier,
            message,
        }
    }

    /// Feed one cycle's detection result.
    ///
    /// A quiet cycle never re-arms the sound gate; only `on_sound_finished`
    /// does.
    pub fn on_detection(&self, is_alarm: bool) -> AlertDecision {
        let dispatch = {
            let mut state = self.state.lock();
            if !is_alarm {
                state.phase = AlertPhase::Quiet;
                return AlertDecision::Quiet;
            }

            state.phase = AlertPhase::Alarmed;
            if state.can_play_sound {
                state.can_play_sound = false;
                state.last_notification_at = Some(Utc::now());
                state.alerts_dispatched += 1;
                true
            } else {
                state.alerts_suppressed += 1;
                false
            }
        };

        if !dispatch {
            return AlertDecision::Suppressed;
        }

        // Lock released: the player may call back synchronously
        log::warn!("Alarm detected - dispatching alert");
        let state = Arc::clone(&self.state);
        self.sound.play(Box::new(move || rearm(&state)));
        self.notifier.notify(&self.message.title, &self.message.body);

        AlertDecision::Dispatched
    }

    /// Playback finished; the next alarm may alert again
    pub fn on_sound_finished(&self) {
        rearm(&self.state);
    }

    pub fn state(&self) -> AlertState {
        self.state.lock().clone()
    }
}

fn rearm(state: &Mutex<AlertState>) {
    state.lock().can_play_sound = true;
    log::debug!("Alert re-armed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testing::{CountingNotifier, ManualSound};

    fn debouncer() -> (AlertDebouncer, Arc<ManualSound>, Arc<CountingNotifier>) {
        let sound = Arc::new(ManualSound::default());
        let notifier = Arc::new(CountingNotifier::default());
        let debouncer = AlertDebouncer::new(sound.clone(), notifier.clone(), AlertMessage::default());
        (debouncer, sound, notifier)
    }

    #[test]
    fn test_initial_state() {
        let (debouncer, _, _) = debouncer();
        let state = debouncer.state();
        assert_eq!(state.phase, AlertPhase::Quiet);
        assert!(state.can_play_sound);
        assert!(state.last_notification_at.is_none());
    }

    #[test]
    fn test_repeated_alarm_dispatches_once() {
        let (debouncer, sound, notifier) = debouncer();

        assert_eq!(debouncer.on_detection(true), AlertDecision::Dispatched);
        assert_eq!(debouncer.on_detection(true), AlertDecision::Suppressed);

        assert_eq!(sound.plays(), 1);
        assert_eq!(notifier.count(), 1);

        let state = debouncer.state();
        assert_eq!(state.phase, AlertPhase::Alarmed);
        assert!(!state.can_play_sound);
        assert!(state.last_notification_at.is_some());
        assert_eq!(state.alerts_dispatched, 1);
        assert_eq!(state.alerts_suppressed, 1);
    }

    #[test]
    fn test_sound_finished_rearms() {
        let (debouncer, sound, notifier) = debouncer();

        debouncer.on_detection(true);
        debouncer.on_sound_finished();
        assert_eq!(debouncer.on_detection(true), AlertDecision::Dispatched);

        assert_eq!(sound.plays(), 2);
        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn test_completion_callback_rearms() {
        let (debouncer, sound, _) = debouncer();

        debouncer.on_detection(true);
        assert!(!debouncer.state().can_play_sound);

        sound.finish_all();
        assert!(debouncer.state().can_play_sound);
    }

    #[test]
    fn test_quiet_cycle_does_not_rearm() {
        let (debouncer, sound, _) = debouncer();

        debouncer.on_detection(true);
        assert_eq!(debouncer.on_detection(false), AlertDecision::Quiet);
        assert_eq!(debouncer.state().phase, AlertPhase::Quiet);
        assert!(!debouncer.state().can_play_sound);

        assert_eq!(debouncer.on_detection(true), AlertDecision::Suppressed);
        assert_eq!(sound.plays(), 1);
    }

    #[test]
    fn test_quiet_never_dispatches() {
        let (debouncer, sound, notifier) = debouncer();
        for _ in 0..5 {
            assert_eq!(debouncer.on_detection(false), AlertDecision::Quiet);
        }
        assert_eq!(sound.plays(), 0);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_synchronous_completion_does_not_deadlock() {
        let sound = Arc::new(crate::logic::testing::InstantSound::default());
        let notifier = Arc::new(CountingNotifier::default());
        let debouncer = AlertDebouncer::new(sound, notifier.clone(), AlertMessage::default());

        assert_eq!(debouncer.on_detection(true), AlertDecision::Dispatched);
        assert_eq!(debouncer.on_detection(true), AlertDecision::Dispatched);
        assert_eq!(notifier.count(), 2);
    }
}
