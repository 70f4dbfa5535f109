//! Trained Artifacts
//!
//! JSON documents written by the training pipeline, plus a SHA-256 fingerprint
//! of every file we load so a deployment can tell which model answered.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::DEFAULT_MASK_THRESHOLD;
use crate::logic::error::{ModelError, ModelResult};

/// Concept explainer: NMF components and mask settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptArtifact {
    /// `n_concepts` rows of `channels` non-negative weights
    pub components: Vec<Vec<f32>>,

    /// Fraction of the peak activation a pixel needs to count as active
    #[serde(default = "default_mask_threshold")]
    pub mask_threshold: f32,
}

fn default_mask_threshold() -> f32 {
    DEFAULT_MASK_THRESHOLD
}

impl ConceptArtifact {
    pub fn components_matrix(&self) -> ModelResult<Array2<f32>> {
        matrix(&self.components, "components")
    }
}

/// Weight-of-Evidence explainer with Gaussian concept likelihoods per class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoeArtifact {
    pub priors: Vec<f64>,

    /// `[class][concept]`
    pub means: Vec<Vec<f64>>,

    /// `[class][concept]`
    pub variances: Vec<Vec<f64>>,

    /// Added to every variance
    #[serde(default)]
    pub var_smoothing: f64,
}

/// Where an artifact came from and what it hashed to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub sha256: String,
}

/// Read and fingerprint a file
pub fn read_artifact(path: &Path) -> ModelResult<(Vec<u8>, ArtifactInfo)> {
    if !path.exists() {
        return Err(ModelError::ArtifactNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let info = ArtifactInfo {
        path: path.to_path_buf(),
        sha256: fingerprint(&bytes),
    };
    log::info!("Artifact {} (sha256 {})", path.display(), &info.sha256[..12]);
    Ok((bytes, info))
}

/// Read, fingerprint and parse a JSON artifact
pub fn load_json<T: DeserializeOwned>(path: &Path) -> ModelResult<(T, ArtifactInfo)> {
    let (bytes, info) = read_artifact(path)?;
    let value = serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, info))
}

pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn matrix<T: Clone>(rows: &[Vec<T>], what: &str) -> ModelResult<Array2<T>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(ModelError::InvalidArtifact(format!("{} rows differ in length", what)));
    }
    let flat: Vec<T> = rows.iter().flatten().cloned().collect();
    Ok(Array2::from_shape_vec((n_rows, n_cols), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_concept_artifact_with_default_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exp.json");
        std::fs::write(&path, r#"{"components": [[1.0, 0.0], [0.5, 0.5]]}"#).unwrap();

        let (artifact, info): (ConceptArtifact, _) = load_json(&path).unwrap();
        assert_eq!(artifact.mask_threshold, DEFAULT_MASK_THRESHOLD);
        assert_eq!(artifact.components_matrix().unwrap().dim(), (2, 2));
        assert_eq!(info.sha256.len(), 64);
        assert_eq!(info.path, path);
    }

    #[test]
    fn test_ragged_components_rejected() {
        let artifact = ConceptArtifact {
            components: vec![vec![1.0, 0.0], vec![1.0]],
            mask_threshold: 0.5,
        };
        assert!(matches!(artifact.components_matrix(), Err(ModelError::InvalidArtifact(_))));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("woe.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_json::<WoeArtifact>(&path).unwrap_err();
        assert!(err.to_string().contains("woe.json"));
    }

    #[test]
    fn test_missing_artifact() {
        let err = load_json::<WoeArtifact>(Path::new("/nope/woe.json")).unwrap_err();
        assert!(matches!(err, ModelError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
