//! Failure taxonomy for command, stage and pipeline execution
//!
//! Each layer wraps exactly one error from the layer below as its source,
//! so the rendered chain names the pipeline, the stage and the command.

use std::io;
use thiserror::Error;

/// The process could not be started at all
#[derive(Debug, Error)]
#[error("failed to start `{command}`: {source}")]
pub struct SpawnError {
    pub command: String,
    #[source]
    pub source: io::Error,
}

/// The process started but exited unsuccessfully
#[derive(Debug, Error)]
#[error("`{command}` {}", describe_exit(.code))]
pub struct CommandFailure {
    pub command: String,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Why a single command did not succeed
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Failed(#[from] CommandFailure),
}

/// First failing command of a stage
#[derive(Debug, Error)]
#[error("stage '{stage}' failed at command #{command_index}: {cause}")]
pub struct StageFailure {
    pub stage: String,
    /// Zero-based index of the failing command within the stage
    pub command_index: usize,
    #[source]
    pub cause: CommandError,
}

/// First failing stage of a pipeline
#[derive(Debug, Error)]
#[error("pipeline '{pipeline}' aborted at stage {position}/{total}: {failure}")]
pub struct PipelineFailure {
    pub pipeline: String,
    /// One-based position of the failing stage
    pub position: usize,
    pub total: usize,
    #[source]
    pub failure: StageFailure,
}

impl PipelineFailure {
    pub fn stage_name(&self) -> &str {
        &self.failure.stage
    }
}
