//! Integration tests for the ETL skeleton.
//!
//! These tests drive complete pipelines through `run` using real directories
//! and Polars DataFrames.

use batch_etl::io::{parquet_path, read_parquet};
use batch_etl::{
    ClosureStageObserver, CsvToParquet, Etl, EtlError, PipelineBase, PipelineConfig,
    RunPipeline, Stage, StageEvent,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy every fixture file into `dir`.
fn stage_fixtures(dir: &Path) {
    for entry in std::fs::read_dir(fixtures_path()).expect("fixtures directory") {
        let path = entry.unwrap().path();
        std::fs::copy(&path, dir.join(path.file_name().unwrap())).unwrap();
    }
}

fn sample_table() -> DataFrame {
    df!(
        "city" => ["Recife", "Natal", "Recife"],
        "cases" => [10i64, 4, 6]
    )
    .unwrap()
}

/// The transformation applied by [`Aggregate`]: total cases per city.
fn total_cases(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col("city")])
        .agg([col("cases").sum()])
        .sort(["city"], Default::default())
        .collect()
}

/// Extracts `{"raw": sample_table()}` and transforms it into `{"clean": total_cases(raw)}`.
struct Aggregate {
    base: PipelineBase,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Aggregate {
    fn new(config: PipelineConfig) -> Self {
        Self {
            base: PipelineBase::new(config),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Etl for Aggregate {
    type Dataset = DataFrame;
    type Error = EtlError;

    fn base(&self) -> &PipelineBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PipelineBase {
        &mut self.base
    }

    fn extract(&mut self) -> Result<(), EtlError> {
        self.calls.lock().unwrap().push("extract");
        self.base.inputs_mut().insert("raw", sample_table());
        Ok(())
    }

    fn transform(&mut self) -> Result<(), EtlError> {
        self.calls.lock().unwrap().push("transform");
        let clean = total_cases(self.base.inputs().require("raw")?)?;
        self.base.outputs_mut().insert("clean", clean);
        Ok(())
    }
}

/// Transform depends on a dataset that extract never produces.
struct MissingInput {
    base: PipelineBase,
    loaded: bool,
}

impl Etl for MissingInput {
    type Dataset = DataFrame;
    type Error = EtlError;

    fn base(&self) -> &PipelineBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PipelineBase {
        &mut self.base
    }

    fn extract(&mut self) -> Result<(), EtlError> {
        self.base.inputs_mut().insert("raw", sample_table());
        Ok(())
    }

    fn transform(&mut self) -> Result<(), EtlError> {
        let lookup = self.base.inputs().require("lookup")?.clone();
        self.base.outputs_mut().insert("joined", lookup);
        Ok(())
    }

    fn load(&mut self) -> Result<(), EtlError> {
        self.loaded = true;
        Ok(())
    }
}

fn config_in(tmp: &TempDir) -> PipelineConfig {
    PipelineConfig::new(tmp.path().join("input"), tmp.path().join("output")).unwrap()
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_raw_to_clean_scenario() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = Aggregate::new(config_in(&tmp));

    pipeline.run().unwrap();

    let inputs = pipeline.base().inputs();
    assert_eq!(inputs.names(), vec!["raw"]);
    assert!(inputs.require("raw").unwrap().equals(&sample_table()));

    let outputs = pipeline.base().outputs();
    assert_eq!(outputs.names(), vec!["clean"]);
    let expected = total_cases(&sample_table()).unwrap();
    assert!(outputs.require("clean").unwrap().equals(&expected));

    assert_eq!(*pipeline.calls.lock().unwrap(), vec!["extract", "transform"]);
    assert_eq!(pipeline.base().stage(), Stage::Done);
}

#[test]
fn test_default_load_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    let output_dir = config.output_path().to_path_buf();
    let mut pipeline = Aggregate::new(config);

    pipeline.run().unwrap();

    assert_eq!(std::fs::read_dir(output_dir).unwrap().count(), 0);
}

#[test]
fn test_missing_dataset_error_reaches_caller_unchanged() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = MissingInput {
        base: PipelineBase::new(config_in(&tmp)),
        loaded: false,
    };

    let error = pipeline.run().unwrap_err();

    assert!(matches!(error, EtlError::DatasetNotFound(ref name) if name == "lookup"));
    assert!(!pipeline.loaded);
    assert!(pipeline.base().inputs().contains("raw"));
    assert!(pipeline.base().outputs().is_empty());
    assert_eq!(pipeline.base().stage(), Stage::Failed);
}

#[test]
fn test_observer_tracks_successful_run() {
    let tmp = TempDir::new().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let observer = ClosureStageObserver::new(move |event: StageEvent| {
        sink.lock().unwrap().push(event);
    });
    let mut pipeline = Aggregate::new(config_in(&tmp));
    pipeline.base = PipelineBase::new(config_in(&tmp)).with_observer(Arc::new(observer));

    pipeline.run().unwrap();

    let events = events.lock().unwrap();
    let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Pending,
            Stage::Extracting,
            Stage::Transforming,
            Stage::Loading,
            Stage::Done,
        ]
    );
    assert!(events.iter().all(|e| e.pipeline == "Aggregate"));
}

#[test]
fn test_pipeline_can_move_to_worker_thread() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = Aggregate::new(config_in(&tmp));

    let handle = std::thread::spawn(move || {
        pipeline.run().unwrap();
        pipeline
    });
    let pipeline = handle.join().unwrap();

    assert!(pipeline.base().outputs().contains("clean"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_repeated_construction_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("deep/input");
    let output = tmp.path().join("deep/output");

    for _ in 0..2 {
        PipelineConfig::new(&input, &output).unwrap();
    }

    let mut entries: Vec<String> = std::fs::read_dir(tmp.path().join("deep"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["input", "output"]);
}

#[test]
fn test_unwritable_output_fails_construction() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();

    let error = PipelineConfig::new(tmp.path().join("input"), blocker.join("output")).unwrap_err();

    assert!(error.is_config_error());
    assert_eq!(error.error_code(), "CREATE_DIRECTORY_FAILED");
}

// ============================================================================
// CSV to Parquet Pipeline Tests
// ============================================================================

#[test]
fn test_csv_to_parquet_converts_fixtures() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    stage_fixtures(config.input_path());
    let output_dir = config.output_path().to_path_buf();
    let mut pipeline = CsvToParquet::new(config);

    pipeline.run().unwrap();

    assert_eq!(pipeline.base().outputs().names(), vec!["orders", "regions"]);

    let orders = read_parquet(parquet_path(&output_dir, "orders")).unwrap();
    let columns: Vec<String> = orders
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(columns, vec!["order_id", "customer_name", "total_amount"]);

    let names: Vec<Option<String>> = orders
        .column("customer_name")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec![Some("Ana Souza".to_string()), Some("Bruno".to_string()), None]
    );

    let regions = read_parquet(parquet_path(&output_dir, "regions")).unwrap();
    assert_eq!(regions.shape(), (2, 2));
}

#[test]
fn test_csv_to_parquet_second_run_skips_without_reprocess() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("input");
    let output = tmp.path().join("output");
    let config = PipelineConfig::builder()
        .input_path(&input)
        .output_path(&output)
        .reprocess(false)
        .build()
        .unwrap();
    stage_fixtures(&input);

    let mut first = CsvToParquet::new(config.clone());
    first.run().unwrap();
    assert!(first.skipped().is_empty());

    let mut second = CsvToParquet::new(config);
    second.run().unwrap();
    assert_eq!(second.skipped(), ["orders".to_string(), "regions".to_string()]);
    assert!(second.base().outputs().is_empty());
}

#[test]
fn test_csv_to_parquet_missing_input_directory_fails_in_extract() {
    let tmp = TempDir::new().unwrap();
    let config = PipelineConfig::builder()
        .input_path(tmp.path().join("absent"))
        .output_path(tmp.path().join("output"))
        .create_paths(false)
        .build()
        .unwrap();
    let mut pipeline = CsvToParquet::new(config);

    let error = pipeline.run().unwrap_err();

    assert_eq!(error.error_code(), "IO_ERROR");
    assert_eq!(pipeline.base().stage(), Stage::Failed);
    assert!(!tmp.path().join("output").exists());
}
