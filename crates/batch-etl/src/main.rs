//! CLI entry point: converts a directory of CSV files into Parquet.

use anyhow::{Result, anyhow};
use batch_etl::{CsvToParquet, Etl, PipelineConfig, RunPipeline};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Batch CSV to Parquet conversion job",
    long_about = "Reads every CSV file in the input directory, normalises column names,\n\
                  trims string values and writes one Parquet file per dataset.\n\n\
                  EXAMPLES:\n  \
                  # Convert data/raw/*.csv into data/processed/*.parquet\n  \
                  batch-etl -i data/raw -o data/processed\n\n  \
                  # Only convert files that have no Parquet output yet\n  \
                  batch-etl -i data/raw -o data/processed --no-reprocess\n\n  \
                  # Read paths and flags from a JSON config file\n  \
                  batch-etl --config job.json"
)]
struct Args {
    /// Directory containing the input CSV files
    #[arg(short, long, required_unless_present = "config")]
    input: Option<PathBuf>,

    /// Directory that receives the Parquet files
    #[arg(short, long, required_unless_present = "config")]
    output: Option<PathBuf>,

    /// JSON file with `input_path`, `output_path`, `create_paths` and `reprocess`
    ///
    /// Cannot be combined with the path and flag options
    #[arg(short, long, conflicts_with_all = ["input", "output"])]
    config: Option<PathBuf>,

    /// Do not create missing input/output directories
    #[arg(long, conflicts_with = "config")]
    no_create_paths: bool,

    /// Skip datasets whose Parquet output already exists
    #[arg(long, conflicts_with = "config")]
    no_reprocess: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    if let Some(path) = &args.config {
        info!("Loading configuration from: {}", path.display());
        return Ok(PipelineConfig::from_json_file(path)?);
    }

    let input = args
        .input
        .clone()
        .ok_or_else(|| anyhow!("--input is required without --config"))?;
    let output = args
        .output
        .clone()
        .ok_or_else(|| anyhow!("--output is required without --config"))?;

    Ok(PipelineConfig::builder()
        .input_path(input)
        .output_path(output)
        .create_paths(!args.no_create_paths)
        .reprocess(!args.no_reprocess)
        .build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let config = build_config(&args)?;
    if !config.input_path().is_dir() {
        return Err(anyhow!(
            "Input directory not found: {}",
            config.input_path().display()
        ));
    }

    let mut pipeline = CsvToParquet::new(config);
    info!("Running {}", pipeline);
    pipeline.run()?;

    let outputs = pipeline.base().outputs();
    info!(
        "Converted {} dataset(s), skipped {}",
        outputs.len(),
        pipeline.skipped().len()
    );
    for name in outputs.names() {
        info!("  - {}", name);
    }

    Ok(())
}
