//! Example Store
//!
//! Append-only collection of labelled embeddings.
//! Labels keep the order in which they were first seen; examples keep
//! insertion order within their label.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Feature vector produced by the embedder for one frame
pub type Embedding = Vec<f32>;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One labelled training sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    embedding: Embedding,
    label: String,
}

impl Example {
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// All examples for one label
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelClass {
    pub(crate) label: String,
    pub(crate) examples: Vec<Example>,
}

/// Per-label example count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub label: String,
    pub count: usize,
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ExampleStore {
    classes: Vec<LabelClass>,
    dimension: Option<usize>,
}

impl ExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an example.
    ///
    /// The first example fixes the store's dimension; later embeddings of a
    /// different length fail with `DimensionMismatch`.
    pub fn add_example(&mut self, embedding: Embedding, label: &str) -> GuardResult<()> {
        if embedding.is_empty() {
            return Err(GuardError::InvalidEmbedding("embedding is empty".into()));
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(GuardError::InvalidEmbedding("embedding contains non-finite values".into()));
        }
        let len = embedding.len();
        self.check_dimension(len)?;

        let example = Example {
            embedding,
            label: label.to_string(),
        };

        match self.classes.iter_mut().find(|c| c.label == label) {
            Some(class) => class.examples.push(example),
            None => self.classes.push(LabelClass {
                label: label.to_string(),
                examples: vec![example],
            }),
        }

        self.dimension.get_or_insert(len);

        Ok(())
    }

    /// Fail if `len` disagrees with the established dimension
    pub fn check_dimension(&self, len: usize) -> GuardResult<()> {
        match self.dimension {
            Some(expected) if expected != len => Err(GuardError::DimensionMismatch {
                expected,
                actual: len,
            }),
            _ => Ok(()),
        }
    }

    /// Labels with at least one example, in first-seen order
    pub fn labels(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.iter().all(|c| c.examples.is_empty())
    }

    /// Total number of examples
    pub fn len(&self) -> usize {
        self.classes.iter().map(|c| c.examples.len()).sum()
    }

    /// Embedding length, once any example exists
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn example_count(&self, label: &str) -> usize {
        self.classes
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.examples.len())
            .unwrap_or(0)
    }

    pub fn examples(&self, label: &str) -> &[Example] {
        self.classes
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.examples.as_slice())
            .unwrap_or(&[])
    }

    pub fn class_counts(&self) -> Vec<ClassCount> {
        self.classes
            .iter()
            .map(|c| ClassCount {
                label: c.label.clone(),
                count: c.examples.len(),
            })
            .collect()
    }

    pub(crate) fn classes(&self) -> &[LabelClass] {
        &self.classes
    }
}
