// cartkeep/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` type: an ordered list of named steps plus the
//! async handlers registered against them.

use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed async step handler.
///
/// Handlers take a clone of the run's `ContextData`, must drop any lock guard
/// before awaiting, and resolve to a [`PipelineControl`] or the pipeline error.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// Evaluated right before a step; `true` skips the step entirely.
pub type SkipCondition<TData> = Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

pub(crate) struct StepDef<TData: 'static + Send + Sync> {
  pub(crate) name: String,
  pub(crate) skip_if: Option<SkipCondition<TData>>,
}

impl<TData: 'static + Send + Sync> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<crate::error::PipelineError> + Send + Sync + 'static,
{
  pub(crate) name: &'static str,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<crate::error::PipelineError> + Send + Sync + 'static,
{
  /// Declares a pipeline and its steps, in execution order.
  pub fn new(name: &'static str, step_defs: &[(&str, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, skip_if)| StepDef {
        name: (*step_name).to_string(),
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      name,
      steps,
      on: HashMap::new(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Registers a handler for `step_name`. Several handlers on one step run in
  /// registration order.
  ///
  /// Panics if the step was not declared in [`Pipeline::new`]; that is a wiring
  /// mistake, not a runtime condition.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "pipeline '{}' has no step named '{}'; declare it before registering handlers",
        self.name, step_name
      );
    }
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }
}
