//! State owned by every pipeline: configuration and the two dataset registries.

use crate::config::PipelineConfig;
use crate::pipeline::stage::{Stage, StageEvent, StageObserver};
use crate::registry::DatasetRegistry;
use polars::prelude::DataFrame;
use std::fmt;
use std::sync::Arc;

/// Shared state embedded in each concrete pipeline.
///
/// `inputs` collects what `extract` produces and `transform` consumes;
/// `outputs` collects what `transform` produces and `load` consumes. Both
/// start empty and are only ever written by the concrete pipeline. Nothing
/// clears them between stages or between runs.
pub struct PipelineBase<T = DataFrame> {
    config: PipelineConfig,
    inputs: DatasetRegistry<T>,
    outputs: DatasetRegistry<T>,
    stage: Stage,
    observer: Option<Arc<dyn StageObserver>>,
}

// Pipelines may be handed to a worker thread as a whole.
static_assertions::assert_impl_all!(PipelineBase: Send);

impl<T> PipelineBase<T> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            inputs: DatasetRegistry::new(),
            outputs: DatasetRegistry::new(),
            stage: Stage::Pending,
            observer: None,
        }
    }

    /// Attach an observer that is told about every stage transition.
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Datasets produced by `extract`.
    pub fn inputs(&self) -> &DatasetRegistry<T> {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut DatasetRegistry<T> {
        &mut self.inputs
    }

    /// Datasets produced by `transform`.
    pub fn outputs(&self) -> &DatasetRegistry<T> {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut DatasetRegistry<T> {
        &mut self.outputs
    }

    /// Borrow the input registry immutably and the output registry mutably at once.
    ///
    /// This is the usual shape of a `transform` body.
    pub fn split_mut(&mut self) -> (&DatasetRegistry<T>, &mut DatasetRegistry<T>) {
        (&self.inputs, &mut self.outputs)
    }

    /// State of the current (or most recent) run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn enter(&mut self, pipeline: &str, stage: Stage) {
        self.stage = stage;
        if let Some(observer) = &self.observer {
            observer.on_stage(StageEvent::new(pipeline, stage));
        }
    }
}

impl<T> fmt::Debug for PipelineBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBase")
            .field("config", &self.config)
            .field("inputs", &self.inputs.names())
            .field("outputs", &self.outputs.names())
            .field("stage", &self.stage)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
