//! Stage executor - runs the commands of one stage with and-then semantics

use crate::{
    core::Stage,
    execution::{
        CommandError, CommandFailure, CommandRunner, EventSink, ExecutionEvent, StageFailure,
    },
};
use tracing::{debug, error, info, warn};

/// Executes a single stage
pub struct StageExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> StageExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Execute a stage without reporting events
    pub async fn execute(&self, stage: &Stage) -> Result<(), StageFailure> {
        self.execute_with_events(stage, &EventSink::new()).await
    }

    /// Execute the stage's commands in order, stopping at the first failure
    ///
    /// Commands that already succeeded are not undone when a later one fails.
    /// An empty stage succeeds trivially.
    pub async fn execute_with_events(
        &self,
        stage: &Stage,
        events: &EventSink,
    ) -> Result<(), StageFailure> {
        info!("Executing stage: {} ({} commands)", stage.name, stage.len());

        for (index, command) in stage.commands.iter().enumerate() {
            let line = command.to_string();
            events.emit(ExecutionEvent::CommandStarted {
                stage: stage.name.clone(),
                index,
                command: line.clone(),
            });

            let outcome = match self.runner.run(command).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Stage {} could not start command #{}: {}", stage.name, index, e);
                    return Err(StageFailure {
                        stage: stage.name.clone(),
                        command_index: index,
                        cause: CommandError::Spawn(e),
                    });
                }
            };

            if outcome.is_success() {
                debug!("Stage {} command #{} succeeded", stage.name, index);
                continue;
            }

            if command.is_failure_allowed() {
                warn!(
                    "Stage {} command #{} `{}` exited with {:?}; continuing",
                    stage.name, index, line, outcome.code
                );
                events.emit(ExecutionEvent::CommandTolerated {
                    stage: stage.name.clone(),
                    index,
                    command: line,
                    code: outcome.code,
                });
                continue;
            }

            error!(
                "Stage {} command #{} `{}` exited with {:?}",
                stage.name, index, line, outcome.code
            );
            return Err(StageFailure {
                stage: stage.name.clone(),
                command_index: index,
                cause: CommandError::Failed(CommandFailure {
                    command: command.display(),
                    code: outcome.code,
                }),
            });
        }

        info!("Stage {} completed successfully", stage.name);
        Ok(())
    }
}
