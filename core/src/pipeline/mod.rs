// cartkeep/src/pipeline/mod.rs

//! A small async step runner. Each cart operation is declared as a sequence of
//! named steps sharing one `ContextData`, so the control flow of an operation
//! reads top to bottom in its step list and every step gets its own trace span.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, SkipCondition};
