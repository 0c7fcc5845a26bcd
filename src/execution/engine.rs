//! Main execution engine - orchestrates the entire pipeline run

use crate::{
    core::{Pipeline, StageState},
    execution::{
        CommandRunner, EventSink, ExecutionEvent, PipelineFailure, PipelineRun, StageExecutor,
    },
};
use chrono::Utc;
use tracing::{error, info};

/// Runs the stages of a pipeline strictly in order, fail-fast
pub struct ExecutionEngine<R> {
    executor: StageExecutor<R>,
    events: EventSink,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            executor: StageExecutor::new(runner),
            events: EventSink::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.events.add(handler);
    }

    pub fn executor(&self) -> &StageExecutor<R> {
        &self.executor
    }

    /// Execute the entire pipeline
    ///
    /// Stops at the first failing stage: later stages are never started and
    /// nothing already done is rolled back. There are no retries.
    pub async fn execute(&self, pipeline: &Pipeline) -> PipelineRun {
        let mut run = PipelineRun::start(pipeline);
        let total = pipeline.stages.len();

        info!(
            "Starting pipeline execution: {} ({})",
            pipeline.name, run.execution_id
        );
        self.events.emit(ExecutionEvent::PipelineStarted {
            execution_id: run.execution_id,
            pipeline_name: pipeline.name.clone(),
            total_stages: total,
        });

        for (index, stage) in pipeline.stages.iter().enumerate() {
            let started_at = Utc::now();
            run.set_stage(index, StageState::Running { started_at });
            self.events.emit(ExecutionEvent::StageStarted {
                stage: stage.name.clone(),
                label: stage.label.clone(),
                position: index + 1,
                total,
            });

            match self.executor.execute_with_events(stage, &self.events).await {
                Ok(()) => {
                    run.set_stage(
                        index,
                        StageState::Completed {
                            started_at,
                            completed_at: Utc::now(),
                        },
                    );
                    self.events.emit(ExecutionEvent::StageCompleted {
                        stage: stage.name.clone(),
                    });
                }
                Err(failure) => {
                    let message = failure.cause.to_string();
                    run.set_stage(
                        index,
                        StageState::Failed {
                            command_index: failure.command_index,
                            error: message.clone(),
                            started_at,
                            failed_at: Utc::now(),
                        },
                    );
                    self.events.emit(ExecutionEvent::StageFailed {
                        stage: stage.name.clone(),
                        command_index: failure.command_index,
                        error: message,
                    });

                    let failure = PipelineFailure {
                        pipeline: pipeline.name.clone(),
                        position: index + 1,
                        total,
                        failure,
                    };
                    error!("{}", failure);
                    run.fail(failure);
                    self.finish(&run);
                    return run;
                }
            }
        }

        run.complete();
        info!("Pipeline execution finished: {} - {:?}", pipeline.name, run.status);
        self.finish(&run);
        run
    }

    fn finish(&self, run: &PipelineRun) {
        let elapsed = run
            .completed_at
            .unwrap_or_else(Utc::now)
            .signed_duration_since(run.started_at)
            .to_std()
            .unwrap_or_default();
        self.events.emit(ExecutionEvent::PipelineCompleted {
            execution_id: run.execution_id,
            pipeline_name: run.pipeline_name.clone(),
            status: run.status,
            elapsed,
        });
    }
}
