//! Adapter Configuration
//!
//! Where the trained artifacts live and how inference is tuned. Defaults come
//! from `constants`; deployments may override the paths from the environment.

use std::path::PathBuf;

use crate::constants::{self, ALGO, MODEL};

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Folder holding the three artifacts
    pub model_dir: PathBuf,

    /// Explicit backbone file, else `<model_dir>/<concept artifact name>`
    pub backbone_path: Option<PathBuf>,

    /// Backbone output holding the concept-layer activations
    pub concept_layer: Option<String>,

    /// Multiplicative-update iterations for the concept projection
    pub nmf_max_iter: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(constants::DEFAULT_SAVE_FOLDER),
            backbone_path: None,
            concept_layer: ALGO.concept_layer(MODEL).map(str::to_string),
            nmf_max_iter: constants::DEFAULT_NMF_MAX_ITER,
        }
    }
}

impl AdapterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_dir: std::env::var("MODEL_DIR")
                .or_else(|_| std::env::var("SAVE_FOLDER"))
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),

            backbone_path: std::env::var("BACKBONE_PATH").ok().map(PathBuf::from),

            concept_layer: std::env::var("CONCEPT_LAYER").ok().or(defaults.concept_layer),

            nmf_max_iter: std::env::var("NMF_MAX_ITER")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.nmf_max_iter),
        }
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    pub fn exp_path(&self) -> PathBuf {
        constants::artifact_path(&self.model_dir, &constants::exp_artifact_name())
    }

    pub fn woe_path(&self) -> PathBuf {
        constants::artifact_path(&self.model_dir, &constants::woe_artifact_name())
    }

    pub fn backbone_path(&self) -> PathBuf {
        self.backbone_path.clone().unwrap_or_else(|| {
            constants::artifact_path(&self.model_dir, &constants::concept_model_artifact_name())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = AdapterConfig::default().with_model_dir("/models");
        assert_eq!(
            config.woe_path(),
            PathBuf::from("/models/ICE_woeexplainer_resnext50_ncomp7_seed445_NMF_mean_original.json")
        );
        assert!(config.backbone_path().to_string_lossy().ends_with(".onnx"));
        assert_eq!(config.concept_layer.as_deref(), Some("layer4"));
    }

    #[test]
    fn test_explicit_backbone_path_wins() {
        let config = AdapterConfig {
            backbone_path: Some(PathBuf::from("/tmp/backbone.onnx")),
            ..Default::default()
        };
        assert_eq!(config.backbone_path(), PathBuf::from("/tmp/backbone.onnx"));
    }
}
