//! Model Errors

use std::path::PathBuf;

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("ONNX runtime: {0}")]
    Runtime(String),

    #[error("tensor shape: {0}")]
    Shape(String),
}

impl From<ndarray::ShapeError> for ModelError {
    fn from(err: ndarray::ShapeError) -> Self {
        ModelError::Shape(err.to_string())
    }
}
