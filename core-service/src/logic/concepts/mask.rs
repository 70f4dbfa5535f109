//! Concept Masks
//!
//! A concept's activation channel is upsampled to the network input size and
//! thresholded against its own peak.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::logic::error::{ModelError, ModelResult};

#[derive(Debug, Clone)]
pub struct ConceptMasker {
    /// Output mask side (the resized image)
    pub size: usize,
    /// Fraction of the channel peak a pixel must reach
    pub threshold: f32,
}

impl ConceptMasker {
    pub fn new(size: usize, threshold: f32) -> ModelResult<Self> {
        if size == 0 {
            return Err(ModelError::InvalidArtifact("mask size must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::InvalidArtifact(format!(
                "mask threshold {} outside [0, 1]",
                threshold
            )));
        }
        Ok(Self { size, threshold })
    }

    /// Binary `(size, size)` mask for concept `concept` of an `(h, w, k)` map
    pub fn mask(&self, concept_map: &Array3<f32>, concept: usize) -> ModelResult<Array2<bool>> {
        let (_, _, k) = concept_map.dim();
        if concept >= k {
            return Err(ModelError::Shape(format!("concept {} out of {}", concept, k)));
        }
        let channel = concept_map.index_axis(Axis(2), concept);
        let upsampled = upsample_bilinear(channel, self.size, self.size);

        let peak = upsampled.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        if !peak.is_finite() || peak <= 0.0 {
            return Ok(Array2::from_elem((self.size, self.size), false));
        }

        let cutoff = self.threshold * peak;
        Ok(upsampled.mapv(|v| v > 0.0 && v >= cutoff))
    }
}

/// Bilinear resize with half-pixel centers (align_corners = false)
pub fn upsample_bilinear(input: ArrayView2<f32>, out_h: usize, out_w: usize) -> Array2<f32> {
    let (in_h, in_w) = input.dim();
    if in_h == 0 || in_w == 0 {
        return Array2::zeros((out_h, out_w));
    }

    let ys: Vec<(usize, usize, f32)> = (0..out_h).map(|o| source_coord(o, in_h, out_h)).collect();
    let xs: Vec<(usize, usize, f32)> = (0..out_w).map(|o| source_coord(o, in_w, out_w)).collect();

    Array2::from_shape_fn((out_h, out_w), |(oy, ox)| {
        let (y0, y1, ly) = ys[oy];
        let (x0, x1, lx) = xs[ox];
        let top = input[[y0, x0]] * (1.0 - lx) + input[[y0, x1]] * lx;
        let bottom = input[[y1, x0]] * (1.0 - lx) + input[[y1, x1]] * lx;
        top * (1.0 - ly) + bottom * ly
    })
}

fn source_coord(out: usize, in_len: usize, out_len: usize) -> (usize, usize, f32) {
    let scale = in_len as f32 / out_len as f32;
    let src = ((out as f32 + 0.5) * scale - 0.5).clamp(0.0, (in_len - 1) as f32);
    let lo = src.floor() as usize;
    let hi = (lo + 1).min(in_len - 1);
    (lo, hi, src - lo as f32)
}
