//! Test utilities shared by the scenarios

use async_trait::async_trait;
use relay::core::{Command, ExecutionStatus, Pipeline, Stage, StageState};
use relay::execution::{CommandOutcome, CommandRunner, ExecutionEngine, PipelineRun, SpawnError};
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

/// Scripted outcome for a command line
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Exit(i32),
    NotFound,
}

/// Runner that records every command line and never spawns anything
///
/// Commands succeed unless scripted otherwise.
#[derive(Default)]
pub struct MockRunner {
    script: HashMap<String, Outcome>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `line` exit with `code`
    pub fn exits(mut self, line: &str, code: i32) -> Self {
        self.script.insert(line.to_string(), Outcome::Exit(code));
        self
    }

    /// Make `line` fail to spawn
    pub fn missing(mut self, line: &str) -> Self {
        self.script.insert(line.to_string(), Outcome::NotFound);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &Command) -> Result<CommandOutcome, SpawnError> {
        let line = command.display();
        self.calls.lock().unwrap().push(line.clone());

        match self.script.get(&line) {
            None => Ok(CommandOutcome::success()),
            Some(Outcome::Exit(code)) => Ok(CommandOutcome::exited(*code)),
            Some(Outcome::NotFound) => Err(SpawnError {
                command: line,
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}

/// Build a stage from shell-like command lines
pub fn stage(name: &str, lines: &[&str]) -> Stage {
    Stage::new(name).commands(lines.iter().map(|line| Command::parse(line).unwrap()))
}

/// Run a pipeline against a mock runner, returning the run and the commands issued
pub async fn run_pipeline_with_mock(pipeline: &Pipeline, runner: MockRunner) -> (PipelineRun, Vec<String>) {
    let engine = ExecutionEngine::new(runner);
    let run = engine.execute(pipeline).await;
    let calls = engine.executor().runner().calls();
    (run, calls)
}

/// Assert that the pipeline completed successfully
pub fn assert_pipeline_completed(run: &PipelineRun) {
    assert_eq!(
        run.status,
        ExecutionStatus::Completed,
        "Expected pipeline to complete, failure: {:?}",
        run.failure
    );
    assert_eq!(run.exit_code(), 0);
}

/// Assert that the pipeline failed with a non-zero exit code
pub fn assert_pipeline_failed(run: &PipelineRun) {
    assert_eq!(run.status, ExecutionStatus::Failed, "Expected pipeline to fail");
    assert_ne!(run.exit_code(), 0);
    assert!(run.failure.is_some(), "Failed run should carry its failure");
}

/// Assert that `stage` failed at the zero-based `command_index`
pub fn assert_stage_failed(run: &PipelineRun, stage: &str, command_index: usize) {
    match run.stage_state(stage) {
        Some(StageState::Failed {
            command_index: index,
            ..
        }) => assert_eq!(*index, command_index, "Stage '{}' failed at the wrong command", stage),
        other => panic!("Expected stage '{}' to fail, got {:?}", stage, other),
    }
}

/// Assert which stages were started, in order
pub fn assert_execution_order(run: &PipelineRun, expected: &[&str]) {
    assert_eq!(run.started_stages(), expected, "Stage execution order mismatch");
}
