//! Feature Areas - mask bounding boxes in container coordinates

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Inclusive pixel bounds of the active region of a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// `None` when no pixel is active
    pub fn of_mask(mask: &Array2<bool>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for ((y, x), &active) in mask.indexed_iter() {
            if !active {
                continue;
            }
            bounds = Some(match bounds {
                None => Self { min_x: x, min_y: y, max_x: x, max_y: y },
                Some(b) => Self {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }
        bounds
    }
}

/// Region in the caller's container units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaCoordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl AreaCoordinates {
    /// Map a box on a `mask_w × mask_h` grid onto a `container_w × container_h`
    /// container. Every field is linear in the container size.
    pub fn scaled(
        bbox: BoundingBox,
        mask_w: usize,
        mask_h: usize,
        container_w: f64,
        container_h: f64,
    ) -> Self {
        let along_x = |px: usize| px as f64 * container_w / mask_w as f64;
        let along_y = |px: usize| px as f64 * container_h / mask_h as f64;
        Self {
            x: along_x(bbox.min_x),
            y: along_y(bbox.min_y),
            width: along_x(bbox.max_x - bbox.min_x + 1),
            height: along_y(bbox.max_y - bbox.min_y + 1),
        }
    }

    /// Bounding box of `mask` in container units, `None` for an empty mask
    pub fn from_mask(mask: &Array2<bool>, container_w: f64, container_h: f64) -> Option<Self> {
        let (mask_h, mask_w) = mask.dim();
        BoundingBox::of_mask(mask)
            .map(|bbox| Self::scaled(bbox, mask_w, mask_h, container_w, container_h))
    }
}
