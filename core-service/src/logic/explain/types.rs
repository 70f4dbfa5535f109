use serde::{Deserialize, Serialize};

use crate::logic::concepts::AreaCoordinates;
use crate::logic::woe::{EvidenceType, StrengthOfEvidence};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    pub feature_id: usize,
    pub feature_name: String,
    pub evidence_type: EvidenceType,
    pub soe: StrengthOfEvidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hypothesis {
    pub hypothesis_id: usize,
    pub hypothesis_name: String,
    pub evidence: Vec<Evidence>,
    pub probability: f64, // rounded to 2 decimals
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureArea {
    pub feature_id: usize,
    pub feature_name: String,
    pub area_coordinates: AreaCoordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub recommendation: String,
    pub hypotheses: Vec<Hypothesis>,
    pub features: Vec<FeatureArea>,
}

impl PredictionResult {
    pub fn probability_of(&self, hypothesis_id: usize) -> Option<f64> {
        self.hypotheses.iter()
            .find(|h| h.hypothesis_id == hypothesis_id)
            .map(|h| h.probability)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Index of the largest probability; the first one wins a tie
pub fn best_index(probabilities: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in probabilities.iter().enumerate() {
        match best {
            Some((_, max)) if p <= max => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}
