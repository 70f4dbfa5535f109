//! Model Module - backbone, concept reducer and artifacts
//!
//! Turns a preprocessed image into a concept map and a pooled concept
//! feature vector.

pub mod artifacts;
pub mod backbone;
pub mod reducer;
pub mod status;

// Re-export common types
pub use artifacts::{ArtifactInfo, ConceptArtifact, WoeArtifact};
pub use backbone::{FeatureExtractor, OnnxBackbone};
pub use reducer::ConceptReducer;
pub use status::{EngineStatus, LatencyStats};
