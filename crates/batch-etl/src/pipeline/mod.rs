//! Pipeline module.
//!
//! This module provides the pipeline skeleton: the shared base state, the
//! stage capability set and the run orchestration.

mod base;
mod runner;
pub mod stage;

pub use base::PipelineBase;
pub use runner::{Etl, RunPipeline, pipeline_name};
pub use stage::{ClosureStageObserver, Stage, StageEvent, StageObserver};
