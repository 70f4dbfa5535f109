//! Explain Module - per-image predictions with WOE explanations
//!
//! Glues the backbone, concept reducer, concept masks and WOE explainer into
//! the prediction returned to callers.

pub mod engine;
pub mod types;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

#[cfg(test)]
mod tests;

pub use engine::{ConceptFeatures, ExplanationModel};
pub use types::{Evidence, FeatureArea, Hypothesis, PredictionResult};
