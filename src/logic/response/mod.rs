//! Response Module - Alert dispatch
//!
//! # Components
//! - `debouncer.rs`: edge-triggered alert gate
//! - `sound.rs`: sound playback collaborator
//! - `notifier.rs`: notification collaborator + cooldown wrapper
//! - `types.rs`: alert state and decisions

pub mod debouncer;
pub mod notifier;
pub mod sound;
pub mod types;

pub use debouncer::AlertDebouncer;
pub use notifier::{CooldownNotifier, LogNotifier, Notifier};
pub use sound::{SoundFinished, SoundPlayer, TerminalBell};
pub use types::{AlertDecision, AlertMessage, AlertPhase, AlertState};
