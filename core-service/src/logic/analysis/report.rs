//! Batch outputs: per-seed prediction files and printed summaries

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::accuracy::AccuracyStats;
use super::stats::ProbabilityStats;
use super::{AnalysisResult, ImagePrediction};

const RULE_WIDTH: usize = 80;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// `<image_name> <hypothesis>:<prob> ...`, probabilities with 6 decimals
pub fn prediction_line(prediction: &ImagePrediction) -> String {
    let mut line = prediction.image_name.clone();
    for hypothesis in &prediction.result.hypotheses {
        let _ = write!(line, " {}:{:.6}", hypothesis.hypothesis_name, hypothesis.probability);
    }
    line
}

/// Write `predictions_seed_<seed>.txt` into `output_dir`, creating it if needed
pub fn save_predictions(
    results: &[ImagePrediction],
    seed: &str,
    output_dir: &Path,
) -> AnalysisResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(format!("predictions_seed_{}.txt", seed));
    let mut writer = BufWriter::new(std::fs::File::create(&path)?);
    for prediction in results {
        writeln!(writer, "{}", prediction_line(prediction))?;
    }
    writer.flush()?;

    log::info!("Predictions saved to: {}", path.display());
    Ok(path)
}

pub fn accuracy_summary(stats: &AccuracyStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "ACCURACY SUMMARY");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "\nOverall Accuracy: {:.2}%", stats.overall_accuracy);
    let _ = writeln!(out, "Correct: {}/{}", stats.correct, stats.total);

    let _ = writeln!(out, "\nPer-Class Accuracy:");
    for (class_name, class) in &stats.per_class_accuracy {
        let _ = writeln!(out, "  {}:", class_name);
        let _ = writeln!(out, "    Accuracy: {:.2}%", class.accuracy);
        let _ = writeln!(out, "    Correct:  {}/{}", class.correct, class.total);
    }
    out
}

pub fn distribution_summary(distribution: &BTreeMap<String, ProbabilityStats>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "PROBABILITY DISTRIBUTION SUMMARY");
    let _ = writeln!(out, "{}", rule());

    for (class_name, stats) in distribution {
        let _ = writeln!(out, "\n{}:", class_name);
        let _ = writeln!(out, "  Mean:   {:.4}", stats.mean);
        let _ = writeln!(out, "  Std:    {:.4}", stats.std);
        let _ = writeln!(out, "  Min:    {:.4}", stats.min);
        let _ = writeln!(out, "  Max:    {:.4}", stats.max);
        let _ = writeln!(out, "  Median: {:.4}", stats.median);
    }
    out
}
