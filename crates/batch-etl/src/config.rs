//! Path and reprocessing configuration for a single pipeline run.
//!
//! A [`PipelineConfig`] is immutable once built. Building it with
//! `create_paths` enabled creates the input and output directories (and any
//! missing ancestors) as a side effect.

use crate::error::{EtlError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration shared by every stage of a pipeline.
///
/// Use [`PipelineConfig::new()`] for the common case or
/// [`PipelineConfig::builder()`] to override the defaults.
///
/// # Example
///
/// ```rust,no_run
/// use batch_etl::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("data/raw")
///     .output_path("data/processed")
///     .reprocess(false)
///     .build()?;
///
/// assert!(config.create_paths());
/// # Ok::<(), batch_etl::EtlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PipelineConfigFile")]
pub struct PipelineConfig {
    input_path: PathBuf,
    output_path: PathBuf,
    create_paths: bool,
    reprocess: bool,
}

impl PipelineConfig {
    /// Build a configuration with default flags (`create_paths` and `reprocess` both on).
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder()
            .input_path(input_path)
            .output_path(output_path)
            .build()
    }

    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a JSON configuration file and build it.
    ///
    /// Directory creation happens here too when the file enables `create_paths`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Reading config file '{}'", path.display()))?;
        let file: PipelineConfigFile = serde_json::from_str(&contents)?;
        Self::try_from(file)
    }

    /// Directory the pipeline reads its datasets from.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Directory the pipeline writes its results to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Whether the directories were created at construction.
    pub fn create_paths(&self) -> bool {
        self.create_paths
    }

    /// Whether previously produced output should be regenerated.
    ///
    /// The core only stores this flag. Concrete pipelines decide what it means.
    pub fn reprocess(&self) -> bool {
        self.reprocess
    }

    /// Returns true when `artifact` should be (re)produced.
    ///
    /// That is the case when reprocessing is forced or the artifact does not
    /// exist yet. Never consulted by [`crate::RunPipeline::run`].
    pub fn needs_processing(&self, artifact: impl AsRef<Path>) -> bool {
        self.reprocess || !artifact.as_ref().exists()
    }
}

/// On-disk representation of a [`PipelineConfig`].
///
/// Deserialization goes through this type so that loaded configurations are
/// built (and their directories created) exactly like programmatic ones.
/// Both flags default to `true` when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfigFile {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default = "default_true")]
    pub create_paths: bool,
    #[serde(default = "default_true")]
    pub reprocess: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<PipelineConfigFile> for PipelineConfig {
    type Error = EtlError;

    fn try_from(file: PipelineConfigFile) -> Result<Self> {
        PipelineConfig::builder()
            .input_path(file.input_path)
            .output_path(file.output_path)
            .create_paths(file.create_paths)
            .reprocess(file.reprocess)
            .build()
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    create_paths: Option<bool>,
    reprocess: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the input directory.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Create both directories (and missing parents) when building. Default: true
    pub fn create_paths(mut self, create: bool) -> Self {
        self.create_paths = Some(create);
        self
    }

    /// Force regeneration of previously produced output. Default: true
    pub fn reprocess(mut self, reprocess: bool) -> Self {
        self.reprocess = Some(reprocess);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// - [`EtlError::InvalidConfig`] when a path was never set.
    /// - [`EtlError::CreateDirectory`] when `create_paths` is on and a
    ///   directory cannot be created.
    pub fn build(self) -> Result<PipelineConfig> {
        let input_path = required_path(self.input_path, "input_path")?;
        let output_path = required_path(self.output_path, "output_path")?;

        let config = PipelineConfig {
            input_path,
            output_path,
            create_paths: self.create_paths.unwrap_or(true),
            reprocess: self.reprocess.unwrap_or(true),
        };

        if config.create_paths {
            create_dir(&config.input_path)?;
            create_dir(&config.output_path)?;
        }

        Ok(config)
    }
}

/// An empty path means the current directory.
fn required_path(path: Option<PathBuf>, field: &str) -> Result<PathBuf> {
    match path {
        Some(path) if path.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(path) => Ok(path),
        None => Err(EtlError::InvalidConfig(format!("'{}' is required", field))),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| EtlError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Ensured directory exists: {}", path.display());
    Ok(())
}
