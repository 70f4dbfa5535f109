//! Logic Module - Inference & Analysis Engines
//!
//! - `model/` - backbone (ONNX), concept reducer, artifacts
//! - `concepts/` - concept masks and feature areas
//! - `woe/` - Weight-of-Evidence explainer
//! - `explain/` - per-image prediction assembly
//! - `analysis/` - batch evaluation over a test split

pub mod config;
pub mod error;
pub mod preprocess;

pub mod model;
pub mod concepts;
pub mod woe;
pub mod explain;
pub mod analysis;
