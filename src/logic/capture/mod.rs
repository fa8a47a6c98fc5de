//! Capture Module - Frame acquisition and embedding
//!
//! The camera and the pretrained embedding model live outside this crate.
//! They plug in through `FrameSource` and `Embedder`.
//!
//! ## Structure
//! - `synthetic`: in-process camera producing noisy frames around a pose
//! - `embedder`: deterministic mean-pooling embedder

pub mod synthetic;
pub mod embedder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuardResult;
use crate::logic::model::Embedding;

pub use synthetic::SyntheticCamera;
pub use embedder::BlockMeanEmbedder;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One captured frame (grayscale, row-major)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub sequence: u64,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f32>,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(sequence: u64, width: usize, height: usize, pixels: Vec<f32>) -> Self {
        Self {
            sequence,
            width,
            height,
            pixels,
            captured_at: Utc::now(),
        }
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Camera-like source of frames.
///
/// `acquire_frame` may block until a frame is ready.
pub trait FrameSource: Send + Sync {
    fn acquire_frame(&self) -> GuardResult<Frame>;
}

/// Pretrained feature extractor.
///
/// Must be deterministic per frame and return vectors of constant length.
pub trait Embedder: Send + Sync {
    fn embed(&self, frame: &Frame) -> GuardResult<Embedding>;
}
