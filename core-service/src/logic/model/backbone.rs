//! Backbone - ONNX Runtime Integration
//!
//! Runs the exported CNN up to the concept layer and hands back its
//! activations as an `(h, w, channels)` map.

use std::path::Path;

use ndarray::{Array3, Array4, ArrayView4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::error::{ModelError, ModelResult};

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for backbones (ONNX, test doubles, ...)
pub trait FeatureExtractor: Send + Sync {
    /// `input` is `(1, 3, H, W)`; returns non-negative `(h, w, channels)`
    fn extract(&self, input: &Array4<f32>) -> ModelResult<Array3<f32>>;

    fn describe(&self) -> String;
}

/// NCHW activations of a single image → HWC, negatives clamped to zero
pub fn nchw_to_hwc(activations: ArrayView4<f32>) -> ModelResult<Array3<f32>> {
    let shape = activations.shape();
    if shape[0] != 1 {
        return Err(ModelError::Shape(format!("expected batch of 1, got {}", shape[0])));
    }
    let chw = activations.index_axis(ndarray::Axis(0), 0);
    let hwc = chw.permuted_axes([1, 2, 0]);
    Ok(hwc.mapv(|v| v.max(0.0)))
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxBackbone {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl OnnxBackbone {
    /// Load the backbone. `layer` picks the output by name; the first output is
    /// used when the layer is not exported under that name.
    pub fn load(model_path: &Path, layer: Option<&str>) -> ModelResult<Self> {
        log::info!("Loading ONNX backbone from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::ArtifactNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Runtime(format!("Failed to load model: {}", e)))?;

        let named = layer.and_then(|layer| {
            session.outputs().iter().find(|o| o.name() == layer).map(|o| o.name().to_string())
        });
        let output_name = match named {
            Some(name) => name,
            None => {
                let first = session.outputs().first()
                    .map(|o| o.name().to_string())
                    .ok_or_else(|| ModelError::Runtime("No output defined".to_string()))?;
                if let Some(layer) = layer {
                    log::warn!("Backbone has no output named '{}', using '{}'", layer, first);
                }
                first
            }
        };

        log::info!("ONNX backbone loaded (output '{}')", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.display().to_string(),
        })
    }
}

impl FeatureExtractor for OnnxBackbone {
    fn extract(&self, input: &Array4<f32>) -> ModelResult<Array3<f32>> {
        let input_tensor = Value::from_array(input.clone())
            .map_err(|e| ModelError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs.get(self.output_name.as_str())
            .ok_or_else(|| ModelError::Runtime(format!("No output '{}'", self.output_name)))?;

        let (shape, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Runtime(format!("Extract error: {}", e)))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        if dims.len() != 4 {
            return Err(ModelError::Shape(format!(
                "concept layer must be 4-D (NCHW), got {:?}",
                dims
            )));
        }

        let activations = ArrayView4::from_shape((dims[0], dims[1], dims[2], dims[3]), data)?;
        nchw_to_hwc(activations)
    }

    fn describe(&self) -> String {
        format!("onnx:{}#{}", self.model_path, self.output_name)
    }
}
