//! Test split discovery and ground-truth labels
//!
//! Layout: `<root>/<seed>/<subdir>/*.jpg`, where `<seed>` is all digits.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use super::AnalysisResult;

/// Image file name → class index
pub type GroundTruth = HashMap<String, usize>;

#[derive(Debug, Deserialize)]
struct LabelRow {
    image_path: String,
    label: i64,
}

/// Load `image_path,label` rows keyed by the file name of `image_path`.
/// A missing file yields an empty map.
pub fn load_ground_truth(csv_path: &Path) -> AnalysisResult<GroundTruth> {
    let mut ground_truth = GroundTruth::new();

    if !csv_path.exists() {
        log::warn!("Ground truth file not found: {}", csv_path.display());
        return Ok(ground_truth);
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    for (line, row) in reader.deserialize::<LabelRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping ground truth row {}: {}", line + 2, e);
                continue;
            }
        };
        let Ok(label) = usize::try_from(row.label) else {
            log::warn!("Skipping negative label {} for {}", row.label, row.image_path);
            continue;
        };
        let file_name = file_name_of(&row.image_path);
        ground_truth.insert(file_name, label);
    }

    log::info!("Loaded {} ground truth labels from {}", ground_truth.len(), csv_path.display());
    Ok(ground_truth)
}

fn file_name_of(image_path: &str) -> String {
    // Accept paths written on either platform
    image_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(image_path)
        .to_string()
}

/// Seed name → sorted image paths. Seeds without images are left out.
pub fn find_test_images(test_data_dir: &Path) -> AnalysisResult<BTreeMap<String, Vec<PathBuf>>> {
    let mut images_by_seed = BTreeMap::new();

    if !test_data_dir.is_dir() {
        log::error!("{} directory not found", test_data_dir.display());
        return Ok(images_by_seed);
    }

    for entry in std::fs::read_dir(test_data_dir)? {
        let seed_dir = entry?.path();
        let Some(seed) = seed_dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if !seed_dir.is_dir() || seed.is_empty() || !seed.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let mut images: Vec<PathBuf> = WalkDir::new(&seed_dir)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", seed_dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_jpeg(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        if images.is_empty() {
            continue;
        }
        images.sort();
        log::info!("Found {} images in seed {}", images.len(), seed);
        images_by_seed.insert(seed, images);
    }

    Ok(images_by_seed)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg"))
        .unwrap_or(false)
}
