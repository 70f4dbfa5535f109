//! Test fixtures: a fixed-output backbone and a small, hand-checkable model.
//!
//! Concept 0 fires over the whole image, concept 1 over the top-left 2×2
//! cells of a 7×7 grid, the rest never fire. The WOE explainer only separates
//! the classes on concept 0, in favour of Melanoma.

use ndarray::{Array3, Array4};

use crate::constants::{LABEL_FULLNAMES, NO_CONCEPTS};
use crate::logic::error::ModelResult;
use crate::logic::model::{ConceptArtifact, FeatureExtractor, WoeArtifact};
use super::engine::ExplanationModel;

/// Index of Melanoma in the label tables
pub const FAVOURED_CLASS: usize = 4;

pub const GRID: usize = 7;

/// Returns the same activations for every input
pub struct FixedBackbone {
    pub activations: Array3<f32>,
}

impl FeatureExtractor for FixedBackbone {
    fn extract(&self, _input: &Array4<f32>) -> ModelResult<Array3<f32>> {
        Ok(self.activations.clone())
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

pub fn demo_activations() -> Array3<f32> {
    Array3::from_shape_fn((GRID, GRID, NO_CONCEPTS), |(y, x, c)| match c {
        0 => 1.0,
        1 if y < 2 && x < 2 => 1.0,
        _ => 0.0,
    })
}

/// Identity components: activation channel `c` is concept `c`
pub fn demo_concept_artifact() -> ConceptArtifact {
    let components = (0..NO_CONCEPTS)
        .map(|row| (0..NO_CONCEPTS).map(|col| if row == col { 1.0 } else { 0.0 }).collect())
        .collect();
    ConceptArtifact { components, mask_threshold: 0.5 }
}

pub fn demo_woe_artifact() -> WoeArtifact {
    let n_classes = LABEL_FULLNAMES.len();
    let means = (0..n_classes)
        .map(|class| {
            let mut row = vec![0.0; NO_CONCEPTS];
            if class == FAVOURED_CLASS {
                row[0] = 1.0;
            }
            row
        })
        .collect();
    let variances = (0..n_classes)
        .map(|_| {
            let mut row = vec![1.0; NO_CONCEPTS];
            row[0] = 0.1;
            row
        })
        .collect();

    WoeArtifact {
        priors: vec![1.0 / n_classes as f64; n_classes],
        means,
        variances,
        var_smoothing: 0.0,
    }
}

pub fn demo_model() -> ExplanationModel {
    model_with(demo_activations())
}

pub fn model_with(activations: Array3<f32>) -> ExplanationModel {
    ExplanationModel::from_parts(
        Box::new(FixedBackbone { activations }),
        &demo_concept_artifact(),
        &demo_woe_artifact(),
        50,
    )
    .expect("demo artifacts are valid")
}

/// A small PNG upload
pub fn demo_png_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(48, 36, image::Rgb([190, 130, 120]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("PNG encoding into memory");
    bytes
}
