//! Dataset persistence helpers for concrete pipelines.
//!
//! Nothing in the core calls these; they exist so `extract` and `load`
//! implementations do not each re-implement CSV reading and Parquet writing.
//! One file holds one dataset, named after the file stem.

use crate::error::{EtlError, Result, ResultExt};
use crate::registry::DatasetRegistry;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extension used for persisted output datasets.
pub const PARQUET_EXTENSION: &str = "parquet";

/// Read a single CSV file with a header row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening '{}'", path.display()))?
        .finish()
        .context(format!("Parsing '{}'", path.display()))
}

/// Read every `*.csv` file directly inside `dir`.
///
/// Each file becomes a dataset named after its stem (`sales.csv` → `sales`).
/// Subdirectories and other files are ignored.
pub fn read_csv_dir(dir: impl AsRef<Path>) -> Result<DatasetRegistry> {
    let mut registry = DatasetRegistry::new();
    for path in csv_files(dir.as_ref())? {
        let Some(name) = dataset_name(&path) else {
            continue;
        };
        let df = read_csv(&path)?;
        debug!("Read dataset '{}' {:?} from {}", name, df.shape(), path.display());
        registry.insert(name, df);
    }
    Ok(registry)
}

/// List the `*.csv` files directly inside `dir`, sorted by path.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).context(format!("Listing '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Dataset name for a file: its stem, when it is valid UTF-8.
pub fn dataset_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Location `write_parquet_dir` uses for the dataset `name`.
pub fn parquet_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", name, PARQUET_EXTENSION))
}

/// Write one DataFrame to a Parquet file, replacing any existing file.
///
/// The data goes to a sibling `.tmp` file first and is renamed into place, so
/// `path` never holds a partially written file.
pub fn write_parquet(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let staging = staging_path(path);

    if let Err(e) = write_parquet_file(df, &staging) {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    let renamed: std::io::Result<()> = std::fs::rename(&staging, path);
    if renamed.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    renamed.context(format!("Replacing '{}'", path.display()))
}

fn write_parquet_file(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Creating '{}'", path.display()))?;
    ParquetWriter::new(file)
        .finish(df)
        .context(format!("Writing '{}'", path.display()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

/// Read a Parquet file written by [`write_parquet`].
pub fn read_parquet(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).context(format!("Opening '{}'", path.display()))?;
    ParquetReader::new(file)
        .finish()
        .context(format!("Reading '{}'", path.display()))
}

/// Write every dataset in `registry` to `<dir>/<name>.parquet`.
///
/// Returns the written paths in dataset-name order. Every name is checked
/// before the first file is written, so an invalid name writes nothing.
pub fn write_parquet_dir(registry: &mut DatasetRegistry, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    for name in &names {
        validate_file_name(name)?;
    }

    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let path = parquet_path(dir, &name);
        if let Some(df) = registry.get_mut(&name) {
            write_parquet(df, &path)?;
            info!("Dataset saved: {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

fn validate_file_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(EtlError::InvalidDatasetName(name.to_string()));
    }
    Ok(())
}
