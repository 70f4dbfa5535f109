//! Batch analysis of the held-out test images
//!
//! Applies the explanation model to every image under
//! `test_data/<seed>/<subdir>/*.jpg`, writes `predictions_seed_<seed>.txt`
//! and prints accuracy and probability-distribution summaries per seed.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dermwoe_core::constants::{self, ALGO, MODEL, NO_CONCEPTS};
use dermwoe_core::logic::analysis::{self, report, AnalysisOptions};
use dermwoe_core::{AdapterConfig, ExplanationModel};

#[derive(Parser)]
#[command(name = "analyze-test-images")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the explanation model over the test split and summarize it", long_about = None)]
struct Cli {
    /// Root holding one directory per seed
    #[arg(long, default_value = constants::DEFAULT_TEST_DATA_DIR)]
    test_data: PathBuf,

    /// Ground-truth CSV (image_path,label)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Where the prediction files are written
    #[arg(short, long, default_value = constants::DEFAULT_TEST_DATA_DIR)]
    output: PathBuf,

    /// Folder with the trained artifacts (defaults to MODEL_DIR or save_model)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    #[arg(long, default_value_t = constants::BATCH_CONTAINER_WIDTH)]
    container_width: f64,

    #[arg(long, default_value_t = constants::BATCH_CONTAINER_HEIGHT)]
    container_height: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Starting test image analysis...");
    log::info!("Using model: {}", MODEL);
    log::info!("Algorithm: {}", ALGO);
    log::info!("Number of concepts: {}", NO_CONCEPTS);

    let mut config = AdapterConfig::from_env();
    if let Some(model_dir) = cli.model_dir {
        config = config.with_model_dir(model_dir);
    }
    let model = ExplanationModel::load(&config)
        .with_context(|| format!("loading model artifacts from {}", config.model_dir.display()))?;

    let options = AnalysisOptions {
        test_data_dir: cli.test_data,
        labels_path: cli.labels.unwrap_or_else(constants::default_ground_truth_path),
        output_dir: cli.output,
        container_width: cli.container_width,
        container_height: cli.container_height,
    };

    let reports = analysis::run(&model, &options, |seed_report| {
        println!("\n{}", report::rule());
        println!("Seed {}: {}/{} images processed", seed_report.seed, seed_report.results.len(), seed_report.attempted);
        println!("{}", report::rule());

        if let Some(accuracy) = &seed_report.accuracy {
            print!("{}", report::accuracy_summary(accuracy));
        }
        print!("{}", report::distribution_summary(&seed_report.distribution));
    })?;

    if reports.is_empty() {
        println!("No test images found!");
        return Ok(());
    }

    println!("\n{}", report::rule());
    println!("Analysis complete!");
    println!("{}", report::rule());
    Ok(())
}
