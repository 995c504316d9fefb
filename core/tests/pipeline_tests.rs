// tests/pipeline_tests.rs
mod common;

use cartkeep::{ContextData, PipelineControl, PipelineError, PipelineResult};
use cartkeep::pipeline::{Pipeline, SkipCondition};
use common::*;
use serial_test::serial;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Trail {
  steps: Vec<String>,
  stop_at: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
enum TrailError {
  #[error("runner: {0}")]
  Runner(#[from] PipelineError),
  #[error("step failed: {0}")]
  Step(String),
}

type StepFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TrailError>> + Send>>;

fn record(name: &'static str) -> impl Fn(ContextData<Trail>) -> StepFuture + Send + Sync + 'static {
  move |ctx: ContextData<Trail>| -> StepFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps.push(name.to_string());
      if guard.stop_at == Some(name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order_and_share_context() {
  setup_tracing();
  let mut pipeline = Pipeline::<Trail, TrailError>::new("trail", &[("one", None), ("two", None), ("three", None)]);
  pipeline.on_step("three", record("three"));
  pipeline.on_step("one", record("one"));
  pipeline.on_step("two", record("two"));

  let ctx = ContextData::new(Trail::default());
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(ctx.read().steps, vec!["one", "two", "three"]);
  assert_eq!(pipeline.step_names(), vec!["one", "two", "three"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<Trail, TrailError>::new("trail", &[("a", None), ("b", None), ("c", None)]);
  pipeline.on_step("a", record("a"));
  pipeline.on_step("b", record("b"));
  pipeline.on_step("c", record("c"));

  let ctx = ContextData::new(Trail {
    stop_at: Some("b"),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(ctx.read().steps, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<Trail, TrailError>::new("trail", &[("good", None), ("bad", None), ("never", None)]);
  pipeline.on_step("good", record("good"));
  pipeline.on_step("bad", |ctx: ContextData<Trail>| {
    Box::pin(async move {
      ctx.write().steps.push("bad".to_string());
      Err::<PipelineControl, TrailError>(TrailError::Step("boom".to_string()))
    })
  });
  pipeline.on_step("never", record("never"));

  let ctx = ContextData::new(Trail::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, TrailError::Step(ref m) if m == "boom"));
  assert_eq!(ctx.read().steps, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_bypasses_step() {
  setup_tracing();
  let skip_always: SkipCondition<Trail> = Arc::new(|_ctx: ContextData<Trail>| true);
  let mut pipeline =
    Pipeline::<Trail, TrailError>::new("trail", &[("first", None), ("skipped", Some(skip_always)), ("last", None)]);
  pipeline.on_step("first", record("first"));
  pipeline.on_step("skipped", record("skipped"));
  pipeline.on_step("last", record("last"));

  let ctx = ContextData::new(Trail::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn step_without_handler_is_reported() {
  setup_tracing();
  let mut pipeline = Pipeline::<Trail, TrailError>::new("trail", &[("wired", None), ("unwired", None)]);
  pipeline.on_step("wired", record("wired"));

  let err = pipeline.run(ContextData::new(Trail::default())).await.unwrap_err();
  match err {
    TrailError::Runner(PipelineError::HandlerMissing { pipeline, step_name }) => {
      assert_eq!(pipeline, "trail");
      assert_eq!(step_name, "unwired");
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "has no step named 'ghost'")]
fn registering_on_undeclared_step_panics() {
  let mut pipeline = Pipeline::<Trail, TrailError>::new("trail", &[("real", None)]);
  pipeline.on_step("ghost", record("ghost"));
}
