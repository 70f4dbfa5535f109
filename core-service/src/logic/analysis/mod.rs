//! Analysis Module - batch evaluation of a test split
//!
//! Runs the explanation model over `test_data/<seed>/<subdir>/*.jpg`, writes
//! one prediction file per seed and collects probability and accuracy
//! statistics. A failing image is logged and skipped.

pub mod accuracy;
pub mod dataset;
pub mod report;
pub mod stats;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::logic::explain::{ExplanationModel, PredictionResult};
use crate::logic::preprocess;

pub use accuracy::{calculate_accuracy, AccuracyStats, ClassAccuracy};
pub use dataset::{find_test_images, load_ground_truth, GroundTruth};
pub use stats::{probability_distribution, ProbabilityStats};

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ground truth CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A prediction tagged with the image it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePrediction {
    pub image_path: PathBuf,
    pub image_name: String,
    #[serde(flatten)]
    pub result: PredictionResult,
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub test_data_dir: PathBuf,
    pub labels_path: PathBuf,
    pub output_dir: PathBuf,
    pub container_width: f64,
    pub container_height: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            test_data_dir: PathBuf::from(constants::DEFAULT_TEST_DATA_DIR),
            labels_path: constants::default_ground_truth_path(),
            output_dir: PathBuf::from(constants::DEFAULT_TEST_DATA_DIR),
            container_width: constants::BATCH_CONTAINER_WIDTH,
            container_height: constants::BATCH_CONTAINER_HEIGHT,
        }
    }
}

/// Everything computed for one seed directory
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub seed: String,
    pub attempted: usize,
    pub results: Vec<ImagePrediction>,
    pub distribution: BTreeMap<String, ProbabilityStats>,
    /// `None` when no ground truth was loaded
    pub accuracy: Option<AccuracyStats>,
    pub predictions_file: PathBuf,
}

/// Predict every image in order, skipping the ones that fail
pub fn process_images(
    model: &ExplanationModel,
    images: &[PathBuf],
    seed: &str,
    options: &AnalysisOptions,
) -> Vec<ImagePrediction> {
    let mut results = Vec::with_capacity(images.len());
    log::info!("Processing {} images for seed {}...", images.len(), seed);

    for (idx, image_path) in images.iter().enumerate() {
        match predict_file(model, image_path, options) {
            Ok(prediction) => results.push(prediction),
            Err(e) => {
                log::error!("Error processing {}: {}", image_path.display(), e);
                continue;
            }
        }

        if (idx + 1) % 10 == 0 {
            log::info!("  Processed {}/{} images...", idx + 1, images.len());
        }
    }

    log::info!("Successfully processed {} images", results.len());
    results
}

fn predict_file(
    model: &ExplanationModel,
    image_path: &Path,
    options: &AnalysisOptions,
) -> crate::logic::error::ModelResult<ImagePrediction> {
    let image = preprocess::open_rgb(image_path)?;
    let result = model.predict_image(&image, options.container_width, options.container_height)?;
    Ok(ImagePrediction {
        image_path: image_path.to_path_buf(),
        image_name: image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        result,
    })
}

/// Process one seed: predict, save, and compute statistics
pub fn analyze_seed(
    model: &ExplanationModel,
    seed: &str,
    images: &[PathBuf],
    ground_truth: &GroundTruth,
    options: &AnalysisOptions,
) -> AnalysisResult<SeedReport> {
    let results = process_images(model, images, seed, options);
    let predictions_file = report::save_predictions(&results, seed, &options.output_dir)?;
    let distribution = probability_distribution(&results);
    let accuracy = if ground_truth.is_empty() {
        None
    } else {
        Some(calculate_accuracy(&results, ground_truth))
    };

    Ok(SeedReport {
        seed: seed.to_string(),
        attempted: images.len(),
        results,
        distribution,
        accuracy,
        predictions_file,
    })
}

/// Run the whole analysis, seeds in ascending order. `on_seed` sees each
/// report as soon as its seed is done.
pub fn run(
    model: &ExplanationModel,
    options: &AnalysisOptions,
    mut on_seed: impl FnMut(&SeedReport),
) -> AnalysisResult<Vec<SeedReport>> {
    let ground_truth = load_ground_truth(&options.labels_path)?;
    let images_by_seed = find_test_images(&options.test_data_dir)?;

    if images_by_seed.is_empty() {
        log::warn!("No test images found!");
        return Ok(Vec::new());
    }

    let mut reports = Vec::with_capacity(images_by_seed.len());
    for (seed, images) in &images_by_seed {
        log::info!("Processing seed: {}", seed);
        let report = analyze_seed(model, seed, images, &ground_truth, options)?;
        on_seed(&report);
        reports.push(report);
    }
    Ok(reports)
}
