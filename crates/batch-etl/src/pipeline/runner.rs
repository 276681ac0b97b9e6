//! The extract/transform/load capability set and the fixed run order.

use crate::pipeline::base::PipelineBase;
use crate::pipeline::stage::Stage;
use std::time::Instant;
use tracing::{debug, info};

/// Capabilities a concrete pipeline must provide.
///
/// `extract` and `transform` are required, so a type that leaves either out
/// does not compile. `load` defaults to doing nothing, which suits dry runs and
/// tests that only need the in-memory results.
///
/// ```compile_fail,E0046
/// use batch_etl::{Etl, EtlError, PipelineBase};
///
/// struct ExtractOnly {
///     base: PipelineBase,
/// }
///
/// impl Etl for ExtractOnly {
///     type Dataset = polars::prelude::DataFrame;
///     type Error = EtlError;
///
///     fn base(&self) -> &PipelineBase { &self.base }
///     fn base_mut(&mut self) -> &mut PipelineBase { &mut self.base }
///
///     fn extract(&mut self) -> Result<(), EtlError> { Ok(()) }
/// }
/// ```
pub trait Etl {
    /// Table type held by the registries.
    type Dataset;

    /// Error returned by any stage. [`RunPipeline::run`] passes it through untouched.
    type Error;

    fn base(&self) -> &PipelineBase<Self::Dataset>;

    fn base_mut(&mut self) -> &mut PipelineBase<Self::Dataset>;

    /// Read datasets and store them in the input registry.
    fn extract(&mut self) -> Result<(), Self::Error>;

    /// Derive datasets from the input registry into the output registry.
    fn transform(&mut self) -> Result<(), Self::Error>;

    /// Persist the output registry. Does nothing unless overridden.
    fn load(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Name of the concrete pipeline type, used for logs and diagnostics.
    fn name(&self) -> &'static str {
        pipeline_name::<Self>()
    }
}

/// Short name of a type, without its module path or generic arguments.
pub fn pipeline_name<P: ?Sized>() -> &'static str {
    let full = std::any::type_name::<P>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Runs the stages of an [`Etl`] pipeline in order.
///
/// Implemented for every [`Etl`] type and cannot be overridden.
pub trait RunPipeline: Etl {
    /// Run `extract`, then `transform`, then `load`.
    ///
    /// The first stage error is returned as-is and later stages are skipped.
    /// Registries keep whatever the completed stages wrote.
    fn run(&mut self) -> Result<(), Self::Error>;
}

impl<P: Etl + ?Sized> RunPipeline for P {
    fn run(&mut self) -> Result<(), Self::Error> {
        let name = self.name();
        let start_time = Instant::now();

        info!(pipeline = name, "Starting pipeline");
        self.base_mut().enter(name, Stage::Pending);

        run_stage(self, name, Stage::Extracting, P::extract)?;
        run_stage(self, name, Stage::Transforming, P::transform)?;
        run_stage(self, name, Stage::Loading, P::load)?;

        self.base_mut().enter(name, Stage::Done);
        info!(
            pipeline = name,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Pipeline completed"
        );
        Ok(())
    }
}

fn run_stage<P, F>(pipeline: &mut P, name: &str, stage: Stage, step: F) -> Result<(), P::Error>
where
    P: Etl + ?Sized,
    F: FnOnce(&mut P) -> Result<(), P::Error>,
{
    pipeline.base_mut().enter(name, stage);
    let stage_start = Instant::now();

    if let Err(e) = step(pipeline) {
        pipeline.base_mut().enter(name, Stage::Failed);
        return Err(e);
    }

    debug!(
        pipeline = name,
        stage = %stage,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Stage finished"
    );
    Ok(())
}
