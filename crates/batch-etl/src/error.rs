//! Error types for the ETL core and its bundled helpers.
//!
//! Stage failures raised by concrete pipelines are never wrapped by the core;
//! [`EtlError`] covers configuration, registry lookups and dataset I/O, and is a
//! convenient `Error` type for pipelines that do not need their own.
//!
//! Errors are serializable so a caller can forward them as `{code, message}`
//! pairs to whatever is driving the job.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ETL crate.
#[derive(Error, Debug)]
pub enum EtlError {
    /// A configured directory could not be created.
    #[error("Failed to create directory '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dataset was requested from a registry that does not hold it.
    #[error("Dataset '{0}' not found in registry")]
    DatasetNotFound(String),

    /// A dataset name cannot be used as a file name.
    #[error("Dataset name '{0}' is not a valid file name")]
    InvalidDatasetName(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EtlError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, independent of the message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CreateDirectory { .. } => "CREATE_DIRECTORY_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::DatasetNotFound(_) => "DATASET_NOT_FOUND",
            Self::InvalidDatasetName(_) => "INVALID_DATASET_NAME",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was raised while building a [`crate::PipelineConfig`].
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::CreateDirectory { .. } | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EtlError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EtlError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for ETL operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Io(e).with_context(context))
    }
}
