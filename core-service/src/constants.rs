//! Central Configuration Constants
//!
//! Single source of truth for the model choice, label tables and
//! Weight-of-Evidence thresholds. These values describe how the artifacts in
//! the model folder were trained and have no runtime override.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================
// Model and algorithm configuration
// ============================================

/// Concept extraction algorithm the artifacts were produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Ice,
    Pcbm,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Ice => "ICE",
            Algorithm::Pcbm => "PCBM",
        }
    }

    /// Backbone layer whose activations feed the concept reducer
    pub fn concept_layer(&self, model: &str) -> Option<&'static str> {
        let table = match self {
            Algorithm::Ice => ICE_CONCEPT_LAYER,
            Algorithm::Pcbm => PCBM_CONCEPT_LAYER,
        };
        table.iter().find(|(name, _)| *name == model).map(|(_, layer)| *layer)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the concept map is pooled into a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Mean,
    Max,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Mean => "mean",
            FeatureType::Max => "max",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ALGO: Algorithm = Algorithm::Ice;
pub const MODEL: &str = "resnext50";
pub const NO_CONCEPTS: usize = 7;
pub const SEED: u64 = 445;
pub const REDUCER: &str = "NMF";
pub const FEATURE_TYPE: FeatureType = FeatureType::Mean;
pub const ICE_CLF: &str = "gnb";
pub const WOE_CLF: &str = "original";
pub const IS_TRAIN_CLF: bool = true;

// ============================================
// Image preprocessing
// ============================================

/// Side length of the square network input
pub const INPUT_RESIZE: u32 = 224;
pub const INPUT_MEAN: [f32; 3] = [0.76303977, 0.5456458, 0.57004434];
pub const INPUT_STD: [f32; 3] = [0.14092788, 0.1526127, 0.1699702];

// ============================================
// Model layers
// ============================================

pub const ICE_CONCEPT_LAYER: &[(&str, &str)] = &[
    ("resnet50", "layer4"),
    ("resnet152", "layer4"),
    ("resnext50", "layer4"),
];

pub const PCBM_CONCEPT_LAYER: &[(&str, &str)] = &[
    ("resnet50", "backbone.features.7"),
    ("resnet152", "backbone.features.7"),
    ("resnext50", "backbone.features.7"),
];

// ============================================
// Labels and features
// ============================================

pub const DXLABELS: [&str; 7] = ["AKIEC", "BCC", "BKL", "DF", "MEL", "NV", "VASC"];

pub const LABEL_FULLNAMES: [&str; 7] = [
    "Actinic keratoses/intraepithelial carcinoma",
    "Basal cell carcinoma",
    "Benign keratosis-like lesions",
    "Dermatofibroma",
    "Melanoma",
    "Melanocytic nevi",
    "Vascular lesions",
];

/// Concept labels indexed by concept id. Line breaks are kept for the
/// front-end, which renders them as two-line captions.
pub const FEATURE_ID_TO_LABEL: [&str; NO_CONCEPTS] = [
    "Reddish\n Structures",
    "Medium Irregular\n Pigmentation",
    "Irregular\n Dots and Globules",
    "Whitish Veils",
    "Light Irregular\n Pigmentation",
    "Dark Irregular\n Pigmentation",
    "Lines (Hair)",
];

pub const LESION_TYPE_DICT: &[(&str, &str)] = &[
    ("akiec", "Actinic keratoses and intraepithelial carcinoma"),
    ("bcc", "basal cell carcinoma"),
    ("bkl", "benign keratosis-like lesions"),
    ("df", "dermatofibroma"),
    ("mel", "melanoma"),
    ("nv", "melanocytic nevi"),
    ("vasc", "vascular lesions"),
];

/// Label for a concept id, `"Concept <id>"` past the end of the table
pub fn feature_label(feature_id: usize) -> String {
    FEATURE_ID_TO_LABEL
        .get(feature_id)
        .map(|label| label.to_string())
        .unwrap_or_else(|| format!("Concept {}", feature_id))
}

/// `"<full name> (<code>)"` as shown to users
pub fn hypothesis_display_name(hypothesis_id: usize) -> Option<String> {
    let full = LABEL_FULLNAMES.get(hypothesis_id)?;
    let code = DXLABELS.get(hypothesis_id)?;
    Some(format!("{} ({})", full, code))
}

/// Long lesion name for a lowercase HAM10000 `dx` code
pub fn lesion_type(code: &str) -> Option<&'static str> {
    let code = code.to_ascii_lowercase();
    LESION_TYPE_DICT
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, name)| *name)
}

// ============================================
// Weight of evidence thresholds
// ============================================

pub const WOE_NEUTRAL: f64 = 1.15;
pub const WOE_SUBSTANTIAL: f64 = 2.3;
pub const WOE_STRONG: f64 = 4.61;
pub const WOE_DECISIVE: f64 = f64::INFINITY;

// ============================================
// Paths and artifacts
// ============================================

/// Default folder holding the trained artifacts
pub const DEFAULT_SAVE_FOLDER: &str = "save_model";

/// Fraction of a concept's peak activation a pixel needs to join its mask
pub const DEFAULT_MASK_THRESHOLD: f32 = 0.5;

/// Multiplicative-update iterations used to project activations onto concepts
pub const DEFAULT_NMF_MAX_ITER: usize = 200;

fn artifact_stem(kind: &str) -> String {
    format!(
        "{}_{}_{}_ncomp{}_seed{}_{}_{}",
        ALGO, kind, MODEL, NO_CONCEPTS, SEED, REDUCER, FEATURE_TYPE
    )
}

fn capitalized(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Concept explainer (reducer components + mask settings)
pub fn exp_artifact_name() -> String {
    format!("{}_clf{}_{}.json", artifact_stem("Exp"), capitalized(IS_TRAIN_CLF), ICE_CLF)
}

/// Weight-of-Evidence explainer
pub fn woe_artifact_name() -> String {
    format!("{}_{}.json", artifact_stem("woeexplainer"), WOE_CLF)
}

/// Backbone network exported to ONNX
pub fn concept_model_artifact_name() -> String {
    format!("{}_clf{}_{}.onnx", artifact_stem("concept"), capitalized(IS_TRAIN_CLF), ICE_CLF)
}

pub fn artifact_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(name)
}

// ============================================
// Batch analysis
// ============================================

/// Container size used by the batch analysis (does not affect probabilities)
pub const BATCH_CONTAINER_WIDTH: f64 = 512.0;
pub const BATCH_CONTAINER_HEIGHT: f64 = 512.0;

pub const DEFAULT_TEST_DATA_DIR: &str = "test_data";

/// Ground-truth file produced alongside the test split for `SEED`
pub fn default_ground_truth_path() -> PathBuf {
    PathBuf::from(DEFAULT_TEST_DATA_DIR).join(format!("test_labels_{}.csv", SEED))
}

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Dermwoe";
