//! Probability distribution per hypothesis over a batch of predictions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ImagePrediction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub count: usize,
}

impl ProbabilityStats {
    /// `None` for an empty sample
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median,
            count: samples.len(),
        })
    }
}

/// Hypothesis name → statistics of its probability across `results`
pub fn probability_distribution(results: &[ImagePrediction]) -> BTreeMap<String, ProbabilityStats> {
    let mut by_class: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for prediction in results {
        for hypothesis in &prediction.result.hypotheses {
            by_class
                .entry(hypothesis.hypothesis_name.clone())
                .or_default()
                .push(hypothesis.probability);
        }
    }

    by_class
        .into_iter()
        .filter_map(|(name, probs)| ProbabilityStats::from_samples(&probs).map(|s| (name, s)))
        .collect()
}
