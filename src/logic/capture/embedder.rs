//! Block-Mean Embedder
//!
//! Splits the pixel buffer into `blocks` contiguous runs and averages each.
//! Cheap and deterministic; a real deployment plugs a pretrained model in
//! behind the same `Embedder` trait.

use super::{Embedder, Frame};
use crate::error::{GuardError, GuardResult};
use crate::logic::model::Embedding;

#[derive(Debug, Clone)]
pub struct BlockMeanEmbedder {
    blocks: usize,
}

impl BlockMeanEmbedder {
    pub fn new(blocks: usize) -> GuardResult<Self> {
        if blocks == 0 {
            return Err(GuardError::Config("embedder needs at least one block".into()));
        }
        Ok(Self { blocks })
    }

    /// Embedding length
    pub fn dimension(&self) -> usize {
        self.blocks
    }
}

impl Embedder for BlockMeanEmbedder {
    fn embed(&self, frame: &Frame) -> GuardResult<Embedding> {
        let n = frame.pixels.len();
        if n < self.blocks {
            return Err(GuardError::Embedding(format!(
                "frame has {} pixels, need at least {}",
                n, self.blocks
            )));
        }

        let base = n / self.blocks;
        let embedding = (0..self.blocks)
            .map(|b| {
                let start = b * base;
                // Last block absorbs the remainder
                let end = if b + 1 == self.blocks { n } else { start + base };
                let block = &frame.pixels[start..end];
                block.iter().sum::<f32>() / block.len() as f32
            })
            .collect();

        Ok(embedding)
    }
}
