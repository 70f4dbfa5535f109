//! Weight-of-Evidence Explainer
//!
//! Class-conditional Gaussian likelihoods over the pooled concept features,
//! independent given the class. For a hypothesis `h` the evidence against the
//! alternative `¬h` (every other class, prior-weighted) is split per concept
//! with the chain rule, so the attributions add up to the total WOE exactly.

use ndarray::Array2;

use crate::logic::error::{ModelError, ModelResult};
use crate::logic::model::WoeArtifact;

/// WOE decomposition of one hypothesis for one input
#[derive(Debug, Clone, PartialEq)]
pub struct WoeExplanation {
    /// Per-concept attributed WOE, in concept order
    pub attwoes: Vec<f64>,
    /// `ln p(x|h) − ln p(x|¬h)`
    pub total_woe: f64,
    /// Prior log-odds `ln P(h) − ln P(¬h)`
    pub base_lods: f64,
}

impl WoeExplanation {
    pub fn posterior_log_odds(&self) -> f64 {
        self.total_woe + self.base_lods
    }

    /// `odds / (1 + odds)`, evaluated without overflowing the odds
    pub fn probability(&self) -> f64 {
        let log_odds = self.posterior_log_odds();
        if log_odds >= 0.0 {
            1.0 / (1.0 + (-log_odds).exp())
        } else {
            let odds = log_odds.exp();
            odds / (1.0 + odds)
        }
    }
}

#[derive(Debug, Clone)]
pub struct WoeExplainer {
    log_priors: Vec<f64>,
    /// `(classes, concepts)`
    means: Array2<f64>,
    /// `(classes, concepts)`, smoothing already applied
    variances: Array2<f64>,
}

impl WoeExplainer {
    pub fn from_artifact(artifact: &WoeArtifact, n_concepts: usize) -> ModelResult<Self> {
        let n_classes = artifact.priors.len();
        if n_classes < 2 {
            return Err(ModelError::InvalidArtifact(
                "WOE explainer needs at least two classes".to_string(),
            ));
        }
        if artifact.priors.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(ModelError::InvalidArtifact("class priors must be positive".to_string()));
        }

        let means = class_matrix(&artifact.means, n_classes, n_concepts, "means")?;
        let variances = class_matrix(&artifact.variances, n_classes, n_concepts, "variances")?
            .mapv(|v| v + artifact.var_smoothing);
        if variances.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(ModelError::InvalidArtifact("variances must be positive".to_string()));
        }

        let total: f64 = artifact.priors.iter().sum();
        let log_priors = artifact.priors.iter().map(|p| (p / total).ln()).collect();

        Ok(Self { log_priors, means, variances })
    }

    pub fn n_classes(&self) -> usize {
        self.log_priors.len()
    }

    pub fn n_concepts(&self) -> usize {
        self.means.ncols()
    }

    /// Explain hypothesis `hypothesis` for concept features `x`
    pub fn explain(&self, x: &[f32], hypothesis: usize) -> ModelResult<WoeExplanation> {
        if hypothesis >= self.n_classes() {
            return Err(ModelError::Shape(format!(
                "hypothesis {} out of {} classes",
                hypothesis,
                self.n_classes()
            )));
        }
        if x.len() != self.n_concepts() {
            return Err(ModelError::Shape(format!(
                "{} concept features, explainer expects {}",
                x.len(),
                self.n_concepts()
            )));
        }

        let alternatives: Vec<usize> = (0..self.n_classes()).filter(|&k| k != hypothesis).collect();
        let alt_log_priors: Vec<f64> = alternatives.iter().map(|&k| self.log_priors[k]).collect();
        let base_lods = self.log_priors[hypothesis] - log_sum_exp(&alt_log_priors);

        // Posterior weights of the alternatives given the concepts seen so far
        let mut weights = alt_log_priors;
        let mut attwoes = Vec::with_capacity(x.len());

        for (i, &value) in x.iter().enumerate() {
            let value = value as f64;
            let log_h = self.log_likelihood(hypothesis, i, value);

            let alt_ll: Vec<f64> = alternatives.iter()
                .map(|&k| self.log_likelihood(k, i, value))
                .collect();

            // Likelihoods relative to h, so a concept every class explains
            // equally well contributes exactly zero.
            let relative: Vec<f64> = weights.iter().zip(&alt_ll)
                .map(|(w, ll)| w + (ll - log_h))
                .collect();
            attwoes.push(log_sum_exp(&weights) - log_sum_exp(&relative));

            for (w, ll) in weights.iter_mut().zip(&alt_ll) {
                *w += ll;
            }
        }

        let total_woe = attwoes.iter().sum();
        Ok(WoeExplanation { attwoes, total_woe, base_lods })
    }

    fn log_likelihood(&self, class: usize, concept: usize, value: f64) -> f64 {
        let mean = self.means[[class, concept]];
        let var = self.variances[[class, concept]];
        -0.5 * ((2.0 * std::f64::consts::PI * var).ln() + (value - mean).powi(2) / var)
    }
}

fn class_matrix(
    rows: &[Vec<f64>],
    n_classes: usize,
    n_concepts: usize,
    what: &str,
) -> ModelResult<Array2<f64>> {
    if rows.len() != n_classes || rows.iter().any(|row| row.len() != n_concepts) {
        return Err(ModelError::InvalidArtifact(format!(
            "{} must be {} classes × {} concepts",
            what, n_classes, n_concepts
        )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((n_classes, n_concepts), flat)?)
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}
