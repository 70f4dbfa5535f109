//! Accuracy against ground-truth labels

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::LABEL_FULLNAMES;
use super::dataset::GroundTruth;
use super::ImagePrediction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracy {
    /// Percent
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    /// Percent, 0 when nothing could be scored
    pub overall_accuracy: f64,
    pub correct: usize,
    pub total: usize,
    /// Keyed by the true class name
    pub per_class_accuracy: BTreeMap<String, ClassAccuracy>,
}

fn percent(correct: usize, total: usize) -> f64 {
    if total > 0 { correct as f64 / total as f64 * 100.0 } else { 0.0 }
}

/// Score every prediction that has a usable ground-truth label. Images
/// without one are skipped with a warning.
pub fn calculate_accuracy(results: &[ImagePrediction], ground_truth: &GroundTruth) -> AccuracyStats {
    let mut correct = 0;
    let mut total = 0;
    let mut per_class: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for prediction in results {
        let Some(&true_index) = ground_truth.get(&prediction.image_name) else {
            log::warn!("No ground truth label for {}", prediction.image_name);
            continue;
        };
        let Some(true_class) = LABEL_FULLNAMES.get(true_index) else {
            log::warn!("Ground truth label {} for {} is not a known class", true_index, prediction.image_name);
            continue;
        };

        let entry = per_class.entry(true_class.to_string()).or_default();
        if prediction.result.recommendation == *true_class {
            correct += 1;
            entry.0 += 1;
        }
        total += 1;
        entry.1 += 1;
    }

    AccuracyStats {
        overall_accuracy: percent(correct, total),
        correct,
        total,
        per_class_accuracy: per_class
            .into_iter()
            .map(|(name, (correct, total))| {
                (name, ClassAccuracy { accuracy: percent(correct, total), correct, total })
            })
            .collect(),
    }
}
