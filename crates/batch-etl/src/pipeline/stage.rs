//! Lifecycle states of a pipeline run and an optional observer for them.
//!
//! Every call to [`crate::RunPipeline::run`] walks the states
//! `Pending → Extracting → Transforming → Loading → Done`. A failing stage
//! moves the run to `Failed` and no later stage is entered.
//!
//! # Example
//!
//! ```rust
//! use batch_etl::{ClosureStageObserver, StageEvent};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let observer = ClosureStageObserver::new(move |event: StageEvent| {
//!     sink.lock().unwrap().push(event.stage);
//! });
//! # let _ = observer;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// States of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No stage has started yet
    #[default]
    Pending,
    /// `extract` is running
    Extracting,
    /// `transform` is running
    Transforming,
    /// `load` is running
    Loading,
    /// All three stages completed
    Done,
    /// A stage returned an error
    Failed,
}

impl Stage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Extracting => "Extracting",
            Self::Transforming => "Transforming",
            Self::Loading => "Loading",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A stage transition reported to a [`StageObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Name of the pipeline type being run
    pub pipeline: String,
    /// State that was just entered
    pub stage: Stage,
}

impl StageEvent {
    pub fn new(pipeline: impl Into<String>, stage: Stage) -> Self {
        Self {
            pipeline: pipeline.into(),
            stage,
        }
    }
}

/// Receives stage transitions from a running pipeline.
///
/// Observers are injected into [`crate::PipelineBase`] at construction. They
/// only watch; an observer cannot influence or interrupt the run.
pub trait StageObserver: Send + Sync {
    /// Called each time the run enters a new [`Stage`].
    fn on_stage(&self, event: StageEvent);
}

/// Wrapper that implements [`StageObserver`] using a closure.
pub struct ClosureStageObserver<F>
where
    F: Fn(StageEvent) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureStageObserver<F>
where
    F: Fn(StageEvent) + Send + Sync,
{
    /// Creates a new closure-based observer.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StageObserver for ClosureStageObserver<F>
where
    F: Fn(StageEvent) + Send + Sync,
{
    fn on_stage(&self, event: StageEvent) {
        (self.callback)(event);
    }
}
