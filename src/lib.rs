//! Touch Guard
//!
//! Few-shot nearest-neighbour classification of a live embedding stream,
//! with a debounced sound + notification alert when the stream matches the
//! alarm label.
//!
//! ```text
//! TrainingController -> ExampleStore <- predict <- InferenceLoop -> AlertDebouncer -> sound / notify
//! ```

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use api::Monitor;
pub use error::{GuardError, GuardResult};
pub use logic::config::MonitorConfig;
