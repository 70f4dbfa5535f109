//! Concept Reducer - NMF projection
//!
//! Every spatial activation vector `a` is expressed as `w · H` with `w >= 0`,
//! where the rows of `H` are the learned concept directions. `H` stays fixed;
//! only `w` is solved for, with multiplicative updates.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::constants::FeatureType;
use crate::logic::error::{ModelError, ModelResult};

const EPSILON: f32 = 1e-10;
const TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct ConceptReducer {
    /// `(n_concepts, channels)`, non-negative
    components: Array2<f32>,
    max_iter: usize,
}

impl ConceptReducer {
    pub fn new(components: Array2<f32>, max_iter: usize) -> ModelResult<Self> {
        if components.nrows() == 0 || components.ncols() == 0 {
            return Err(ModelError::InvalidArtifact("reducer has no components".to_string()));
        }
        if components.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ModelError::InvalidArtifact(
                "NMF components must be finite and non-negative".to_string(),
            ));
        }
        Ok(Self { components, max_iter: max_iter.max(1) })
    }

    pub fn n_concepts(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_channels(&self) -> usize {
        self.components.ncols()
    }

    /// `(h, w, channels)` activations → `(h, w, n_concepts)` concept map
    pub fn transform(&self, activations: &Array3<f32>) -> ModelResult<Array3<f32>> {
        let (h, w, channels) = activations.dim();
        if channels != self.n_channels() {
            return Err(ModelError::Shape(format!(
                "backbone gives {} channels, reducer expects {}",
                channels,
                self.n_channels()
            )));
        }

        let flat = activations
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((h * w, channels))?;
        let weights = self.project(flat.view());
        Ok(weights.into_shape_with_order((h, w, self.n_concepts()))?)
    }

    fn project(&self, data: ArrayView2<f32>) -> Array2<f32> {
        let k = self.n_concepts();
        let n = data.nrows();

        let mean = data.mean().unwrap_or(0.0).max(0.0);
        let init = (mean / k as f32).sqrt().max(EPSILON);
        let mut weights = Array2::<f32>::from_elem((n, k), init);

        let numerator = data.dot(&self.components.t());
        let gram = self.components.dot(&self.components.t());

        for _ in 0..self.max_iter {
            let denominator = weights.dot(&gram);
            let mut max_change = 0.0f32;
            let mut max_value = 0.0f32;

            ndarray::Zip::from(&mut weights)
                .and(&numerator)
                .and(&denominator)
                .for_each(|w, &num, &den| {
                    let updated = *w * num.max(0.0) / (den + EPSILON);
                    max_change = max_change.max((updated - *w).abs());
                    max_value = max_value.max(updated);
                    *w = updated;
                });

            if max_change <= TOLERANCE * max_value.max(EPSILON) {
                break;
            }
        }

        weights
    }
}

/// Pool a concept map over its spatial axes
pub fn pool(concept_map: &Array3<f32>, feature_type: FeatureType) -> ModelResult<Vec<f32>> {
    let (h, w, k) = concept_map.dim();
    if h == 0 || w == 0 {
        return Err(ModelError::Shape("empty concept map".to_string()));
    }
    let flat = concept_map.to_shape((h * w, k))?;
    let pooled = match feature_type {
        FeatureType::Mean => flat.mean_axis(Axis(0))
            .ok_or_else(|| ModelError::Shape("empty concept map".to_string()))?,
        FeatureType::Max => flat.fold_axis(Axis(0), f32::NEG_INFINITY, |acc, &v| acc.max(v)),
    };
    Ok(pooled.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn identity_reducer() -> ConceptReducer {
        ConceptReducer::new(array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], 500).unwrap()
    }

    #[test]
    fn test_identity_components_recover_activations() {
        let activations = Array3::from_shape_fn((2, 2, 3), |(y, x, c)| (y + x + c) as f32 + 0.5);
        let concepts = identity_reducer().transform(&activations).unwrap();

        assert_eq!(concepts.dim(), (2, 2, 3));
        for (a, b) in activations.iter().zip(concepts.iter()) {
            assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_mixed_components() {
        // a = 2·h0 + 1·h1
        let reducer = ConceptReducer::new(array![[1.0, 1.0, 0.0], [0.0, 1.0, 1.0]], 2000).unwrap();
        let activations = Array3::from_shape_vec((1, 1, 3), vec![2.0, 3.0, 1.0]).unwrap();
        let concepts = reducer.transform(&activations).unwrap();

        assert!((concepts[[0, 0, 0]] - 2.0).abs() < 0.05);
        assert!((concepts[[0, 0, 1]] - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_zero_activations_stay_zero() {
        let activations = Array3::<f32>::zeros((3, 3, 3));
        let concepts = identity_reducer().transform(&activations).unwrap();
        assert!(concepts.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_channel_mismatch() {
        let activations = Array3::<f32>::zeros((2, 2, 4));
        assert!(matches!(identity_reducer().transform(&activations), Err(ModelError::Shape(_))));
    }

    #[test]
    fn test_rejects_negative_components() {
        assert!(ConceptReducer::new(array![[1.0, -0.5]], 10).is_err());
    }

    #[test]
    fn test_pooling() {
        let map = Array3::from_shape_vec((1, 2, 2), vec![1.0, 4.0, 3.0, 0.0]).unwrap();
        assert_eq!(pool(&map, FeatureType::Mean).unwrap(), vec![2.0, 2.0]);
        assert_eq!(pool(&map, FeatureType::Max).unwrap(), vec![3.0, 4.0]);
    }
}
