// cartkeep/src/pipeline/control.rs

//! Flow-control signals returned by step handlers, and the outcome of a run.

/// Returned by a step handler to say whether the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Proceed to the next step.
  Continue,
  /// Halt the run here. Later steps are not executed and the run reports
  /// [`PipelineResult::Stopped`]. Used for early exits that are not errors,
  /// e.g. an existing cart was found so nothing needs creating.
  Stop,
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
