//! Pipeline execution engine

pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod report;
pub mod runner;

pub use engine::ExecutionEngine;
pub use error::{CommandError, CommandFailure, PipelineFailure, SpawnError, StageFailure};
pub use events::{EventHandler, EventSink, ExecutionEvent};
pub use executor::StageExecutor;
pub use report::PipelineRun;
pub use runner::{CommandOutcome, CommandRunner, DryRunRunner, ProcessRunner};
