//! Model Module - Few-shot nearest-neighbour classification
//!
//! - `store`: labelled examples
//! - `knn`: prediction against the store
//! - `threshold`: alarm decision on top of a prediction

pub mod store;
pub mod knn;
pub mod threshold;

use std::sync::Arc;

use parking_lot::RwLock;

// Re-export common types
pub use store::{ClassCount, Embedding, Example, ExampleStore};
pub use knn::{predict, LabelScore, PredictionResult};
pub use threshold::DetectionRule;

/// Store shared between training (writer) and inference (reader)
pub type SharedStore = Arc<RwLock<ExampleStore>>;
