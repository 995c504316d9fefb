// cartkeep/src/pipeline/execution.rs

use crate::error::PipelineError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::{PipelineControl, PipelineResult};
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged. A step
  /// without handlers is a wiring error reported as `PipelineError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step = step_name, "Step skipped.");
          continue;
        }
      }

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => {
          event!(Level::ERROR, step = step_name, "Step has no handlers.");
          return Err(Err::from(PipelineError::HandlerMissing {
            pipeline: self.name,
            step_name: step_def.name.clone(),
          }));
        }
      };

      let step_span = span!(Level::DEBUG, "pipeline_step", step_name, step_index = step_idx);
      for handler in handlers {
        match handler(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::DEBUG, step = step_name, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(Level::DEBUG, step = step_name, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
