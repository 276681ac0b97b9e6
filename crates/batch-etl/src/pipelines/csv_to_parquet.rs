//! CSV directory to Parquet directory conversion.

use crate::config::PipelineConfig;
use crate::error::{EtlError, Result};
use crate::io::{csv_files, dataset_name, parquet_path, read_csv, write_parquet_dir};
use crate::pipeline::{Etl, PipelineBase, StageObserver};
use crate::sanitize::{sanitize_column_names, trim_string_columns};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Converts every CSV in the input directory into a cleaned Parquet file.
///
/// - `extract` reads `<input>/<name>.csv` into the input registry as `name`.
///   With `reprocess` off, files whose `<output>/<name>.parquet` already exists
///   are skipped.
/// - `transform` normalises column names and trims string values.
/// - `load` writes `<output>/<name>.parquet` for every output dataset.
#[derive(Debug)]
pub struct CsvToParquet {
    base: PipelineBase,
    skipped: Vec<String>,
}

impl CsvToParquet {
    pub fn new(config: PipelineConfig) -> Self {
        Self::from_base(PipelineBase::new(config))
    }

    pub fn with_observer(config: PipelineConfig, observer: Arc<dyn StageObserver>) -> Self {
        Self::from_base(PipelineBase::new(config).with_observer(observer))
    }

    fn from_base(base: PipelineBase) -> Self {
        Self {
            base,
            skipped: Vec::new(),
        }
    }

    /// Datasets left out by the last `extract` because their output already existed.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

impl Etl for CsvToParquet {
    type Dataset = polars::prelude::DataFrame;
    type Error = EtlError;

    fn base(&self) -> &PipelineBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PipelineBase {
        &mut self.base
    }

    fn extract(&mut self) -> Result<()> {
        self.skipped.clear();
        let config = self.base.config().clone();

        for path in csv_files(config.input_path())? {
            let Some(name) = dataset_name(&path) else {
                continue;
            };
            if !config.needs_processing(parquet_path(config.output_path(), &name)) {
                info!("Skipping '{}': output already exists", name);
                self.skipped.push(name);
                continue;
            }
            let df = read_csv(&path)?;
            info!("Extracted '{}' {:?}", name, df.shape());
            self.base.inputs_mut().insert(name, df);
        }
        Ok(())
    }

    fn transform(&mut self) -> Result<()> {
        let (inputs, outputs) = self.base.split_mut();
        for (name, df) in inputs {
            let cleaned = trim_string_columns(sanitize_column_names(df.clone())?)?;
            outputs.insert(name.clone(), cleaned);
        }
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let output_dir = self.base.config().output_path().to_path_buf();
        let written = write_parquet_dir(self.base.outputs_mut(), &output_dir)?;
        info!("Wrote {} dataset(s) to {}", written.len(), output_dir.display());
        Ok(())
    }
}

impl fmt::Display for CsvToParquet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
