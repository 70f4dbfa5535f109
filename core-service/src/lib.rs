//! Dermwoe Core
//!
//! Interpretable skin-lesion diagnosis: a CNN backbone feeds an NMF concept
//! reducer, concept masks locate each concept on the image, and a
//! Weight-of-Evidence explainer turns concept features into per-hypothesis
//! probabilities with per-concept evidence.

pub mod constants;
pub mod logic;

pub use logic::config::AdapterConfig;
pub use logic::error::{ModelError, ModelResult};
pub use logic::explain::{ExplanationModel, PredictionResult};
