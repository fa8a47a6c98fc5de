//! Error handling

use thiserror::Error;

pub type GuardResult<T> = Result<T, GuardError>;

#[derive(Debug, Error)]
pub enum GuardError {
    // Store / classifier errors
    #[error("embedding has {actual} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no examples have been trained yet")]
    EmptyStore,

    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),

    // External collaborator errors
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    // Control errors
    #[error("inference loop is already running")]
    AlreadyRunning,

    #[error("training for '{label}' aborted after {added} examples: {source}")]
    TrainingAborted {
        label: String,
        added: usize,
        #[source]
        source: Box<GuardError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GuardError {
    /// Errors the inference loop absorbs instead of stopping.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GuardError::EmptyStore)
    }
}
