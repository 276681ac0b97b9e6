//! Batch ETL Skeleton
//!
//! A small, synchronous template for batch data jobs built on Polars.
//!
//! # Overview
//!
//! - **Configuration**: [`PipelineConfig`] holds the input and output
//!   directories, creates them on request, and carries a `reprocess` flag for
//!   concrete pipelines to interpret
//! - **Registries**: [`DatasetRegistry`] maps dataset names to tables; every
//!   pipeline owns one for extracted inputs and one for transformed outputs
//! - **Lifecycle**: the [`Etl`] trait declares `extract`, `transform` and an
//!   optional `load`; [`RunPipeline::run`] calls them in that order and stops at
//!   the first error
//! - **Helpers**: [`io`] reads CSV and writes Parquet, [`pipelines`] ships a
//!   ready-made CSV to Parquet job
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batch_etl::{Etl, EtlError, PipelineBase, PipelineConfig, RunPipeline};
//! use polars::prelude::*;
//!
//! struct Doubler {
//!     base: PipelineBase,
//! }
//!
//! impl Etl for Doubler {
//!     type Dataset = DataFrame;
//!     type Error = EtlError;
//!
//!     fn base(&self) -> &PipelineBase { &self.base }
//!     fn base_mut(&mut self) -> &mut PipelineBase { &mut self.base }
//!
//!     fn extract(&mut self) -> Result<(), EtlError> {
//!         let raw = df!("x" => [1i64, 2, 3])?;
//!         self.base.inputs_mut().insert("raw", raw);
//!         Ok(())
//!     }
//!
//!     fn transform(&mut self) -> Result<(), EtlError> {
//!         let raw = self.base.inputs().require("raw")?.clone();
//!         let clean = raw.lazy().select([col("x") * lit(2)]).collect()?;
//!         self.base.outputs_mut().insert("clean", clean);
//!         Ok(())
//!     }
//! }
//!
//! let config = PipelineConfig::new("data/in", "data/out")?;
//! let mut job = Doubler { base: PipelineBase::new(config) };
//! job.run()?;
//! # Ok::<(), EtlError>(())
//! ```
//!
//! # Errors
//!
//! Building a [`PipelineConfig`] fails with [`EtlError::CreateDirectory`] when
//! a directory cannot be created. Stage errors are the pipeline's own
//! `Etl::Error` type and reach the caller of `run` unchanged.

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod pipelines;
pub mod registry;
pub mod sanitize;

// Re-exports for convenient access
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{EtlError, Result as EtlResult, ResultExt};
pub use pipeline::{
    ClosureStageObserver, Etl, PipelineBase, RunPipeline, Stage, StageEvent, StageObserver,
    pipeline_name,
};
pub use pipelines::CsvToParquet;
pub use registry::DatasetRegistry;
