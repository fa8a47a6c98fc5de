//! Nearest-Neighbour Classifier
//!
//! Scores a query embedding against every example in the store.
//! Input: ExampleStore + query
//! Output: PredictionResult
//!
//! Cost is O(examples) per query, which is fine for a few hundred
//! interactively trained examples. Large stores would need an index.

use serde::{Deserialize, Serialize};

use super::store::ExampleStore;
use crate::error::{GuardError, GuardResult};

/// Keeps the inverse-distance weight finite when a query sits exactly on
/// a label's examples.
const DISTANCE_EPSILON: f64 = 1e-9;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Score for one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    /// Mean squared Euclidean distance to this label's examples
    pub distance: f64,
    /// Normalised inverse-distance weight (0.0 - 1.0)
    pub confidence: f32,
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Most likely label
    pub label: String,
    /// Confidence of `label`
    pub confidence: f32,
    /// One entry per label in the store, in first-seen order
    pub scores: Vec<LabelScore>,
}

impl PredictionResult {
    pub fn confidence_of(&self, label: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.confidence)
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify `query` against every example in `store`.
///
/// Each label's distance is the mean squared Euclidean distance to its
/// examples. Confidence is `1/d` normalised across labels, so the closest
/// label always has the highest confidence. Equal distances go to the label
/// that was trained first.
pub fn predict(store: &ExampleStore, query: &[f32]) -> GuardResult<PredictionResult> {
    if store.is_empty() {
        return Err(GuardError::EmptyStore);
    }
    store.check_dimension(query.len())?;
    if query.iter().any(|v| !v.is_finite()) {
        return Err(GuardError::InvalidEmbedding("query contains non-finite values".into()));
    }

    let distances: Vec<(&str, f64)> = store
        .classes()
        .iter()
        .filter(|class| !class.examples.is_empty())
        .map(|class| {
            let total: f64 = class
                .examples
                .iter()
                .map(|example| squared_distance(example.embedding(), query))
                .sum();
            (class.label.as_str(), total / class.examples.len() as f64)
        })
        .collect();

    let weights: Vec<f64> = distances
        .iter()
        .map(|(_, d)| 1.0 / (d + DISTANCE_EPSILON))
        .collect();
    let weight_sum: f64 = weights.iter().sum();

    // Strict comparison keeps the first-seen label on ties
    let mut best = 0;
    for (i, (_, d)) in distances.iter().enumerate().skip(1) {
        if *d < distances[best].1 {
            best = i;
        }
    }

    let scores: Vec<LabelScore> = distances
        .iter()
        .zip(&weights)
        .map(|((label, distance), weight)| LabelScore {
            label: label.to_string(),
            distance: *distance,
            confidence: (weight / weight_sum) as f32,
        })
        .collect();

    Ok(PredictionResult {
        label: scores[best].label.clone(),
        confidence: scores[best].confidence,
        scores,
    })
}

/// Squared Euclidean distance, accumulated in f64
pub fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = *x as f64 - *y as f64;
            diff * diff
        })
        .sum()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_store(dim: usize) -> ExampleStore {
        let mut store = ExampleStore::new();
        for offset in [0.0, 0.1, -0.1] {
            store.add_example(vec![offset; dim], "safe").unwrap();
        }
        for offset in [10.0, 10.1, 9.9] {
            store.add_example(vec![offset; dim], "alarm").unwrap();
        }
        store
    }

    #[test]
    fn test_empty_store_fails() {
        let store = ExampleStore::new();
        assert!(matches!(predict(&store, &[0.0, 1.0]), Err(GuardError::EmptyStore)));
    }

    #[test]
    fn test_single_example_makes_predict_succeed() {
        let mut store = ExampleStore::new();
        store.add_example(vec![1.0, 1.0], "only").unwrap();

        let result = predict(&store, &[5.0, 5.0]).unwrap();
        assert_eq!(result.label, "only");
        assert!((result.confidence - 1.0).abs() < 1e-6);
        assert_eq!(result.scores.len(), 1);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let store = clustered_store(4);
        let err = predict(&store, &[0.0; 3]).unwrap_err();
        assert!(matches!(err, GuardError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_clustered_scenario() {
        let store = clustered_store(8);

        let near_origin = predict(&store, &[0.2; 8]).unwrap();
        assert_eq!(near_origin.label, "safe");
        assert!(near_origin.confidence > 0.5);

        let near_ten = predict(&store, &[9.8; 8]).unwrap();
        assert_eq!(near_ten.label, "alarm");
        assert!(near_ten.confidence > 0.5);
    }

    #[test]
    fn test_top_label_has_max_confidence_and_belongs_to_store() {
        let mut store = clustered_store(3);
        store.add_example(vec![5.0, -5.0, 5.0], "third").unwrap();

        for query in [[0.0, 0.0, 0.0], [4.0, -4.0, 4.0], [11.0, 11.0, 11.0], [5.0, 5.0, 5.0]] {
            let result = predict(&store, &query).unwrap();
            let labels = store.labels();
            assert!(labels.contains(&result.label.as_str()));
            assert_eq!(result.scores.len(), labels.len());

            let max = result
                .scores
                .iter()
                .map(|s| s.confidence)
                .fold(f32::MIN, f32::max);
            assert_eq!(result.confidence, max);
            assert!(result.scores.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));
        }
    }

    #[test]
    fn test_deterministic_bit_identical() {
        let store = clustered_store(16);
        let query = vec![3.3; 16];
        let first = predict(&store, &query).unwrap();
        let second = predict(&store, &query).unwrap();

        assert_eq!(first.label, second.label);
        for (a, b) in first.scores.iter().zip(&second.scores) {
            assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
            assert_eq!(a.distance.to_bits(), b.distance.to_bits());
        }
    }

    #[test]
    fn test_symmetric_under_example_reordering() {
        let points = [vec![0.0, 1.0], vec![2.0, 0.5], vec![-1.0, 3.0]];

        let mut forward = ExampleStore::new();
        let mut backward = ExampleStore::new();
        for p in &points {
            forward.add_example(p.clone(), "a").unwrap();
        }
        for p in points.iter().rev() {
            backward.add_example(p.clone(), "a").unwrap();
        }
        forward.add_example(vec![8.0, 8.0], "b").unwrap();
        backward.add_example(vec![8.0, 8.0], "b").unwrap();

        let query = [1.5, 2.5];
        let f = predict(&forward, &query).unwrap();
        let b = predict(&backward, &query).unwrap();
        assert_eq!(f.label, b.label);
        for (x, y) in f.scores.iter().zip(&b.scores) {
            assert!((x.confidence - y.confidence).abs() < 1e-6);
        }
    }

    #[test]
    fn test_monotonic_as_example_approaches_query() {
        let query = [0.0, 0.0];
        let mut prev_b = 0.0f32;
        let mut prev_a = 1.0f32;

        for step in [10.0, 8.0, 6.0, 4.0, 3.0, 2.0, 1.0, 0.5] {
            let mut store = ExampleStore::new();
            store.add_example(vec![3.0, 0.0], "A").unwrap();
            store.add_example(vec![0.0, step], "B").unwrap();

            let result = predict(&store, &query).unwrap();
            let a = result.confidence_of("A").unwrap();
            let b = result.confidence_of("B").unwrap();

            assert!(b > prev_b, "B confidence must rise: {} -> {}", prev_b, b);
            assert!(a < prev_a, "A confidence must fall: {} -> {}", prev_a, a);
            prev_a = a;
            prev_b = b;
        }
    }

    #[test]
    fn test_tie_goes_to_first_trained_label() {
        let mut store = ExampleStore::new();
        store.add_example(vec![1.0, 0.0], "first").unwrap();
        store.add_example(vec![-1.0, 0.0], "second").unwrap();

        let result = predict(&store, &[0.0, 0.0]).unwrap();
        assert_eq!(result.label, "first");
        assert_eq!(result.confidence_of("first"), result.confidence_of("second"));
    }

    #[test]
    fn test_exact_match_is_near_certain() {
        let mut store = ExampleStore::new();
        store.add_example(vec![2.0, 2.0], "a").unwrap();
        store.add_example(vec![7.0, 7.0], "b").unwrap();

        let result = predict(&store, &[2.0, 2.0]).unwrap();
        assert_eq!(result.label, "a");
        assert!(result.confidence > 0.999);
    }

    #[test]
    fn test_squared_distance() {
        assert_eq!(squared_distance(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_distance(&[1.0], &[1.0]), 0.0);
    }
}
