//! Transient record of one pipeline run

use crate::{
    core::{ExecutionStatus, Pipeline, StageState},
    execution::PipelineFailure,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Outcome of one pipeline run
#[derive(Debug)]
pub struct PipelineRun {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub pipeline_name: String,

    pub status: ExecutionStatus,

    pub started_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Per-stage state, in pipeline order
    pub stages: Vec<(String, StageState)>,

    /// The failure that aborted the run, if any
    pub failure: Option<PipelineFailure>,
}

impl PipelineRun {
    /// Start a record with every stage pending
    pub fn start(pipeline: &Pipeline) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            pipeline_name: pipeline.name.clone(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            stages: pipeline
                .stages
                .iter()
                .map(|s| (s.name.clone(), StageState::Pending))
                .collect(),
            failure: None,
        }
    }

    pub(crate) fn set_stage(&mut self, index: usize, state: StageState) {
        if let Some(entry) = self.stages.get_mut(index) {
            entry.1 = state;
        }
    }

    /// Mark pipeline as completed
    pub(crate) fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as failed and every stage not yet reached as skipped
    pub(crate) fn fail(&mut self, failure: PipelineFailure) {
        for (_, state) in &mut self.stages {
            if matches!(state, StageState::Pending) {
                *state = StageState::Skipped;
            }
        }
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.failure = Some(failure);
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// Process exit status for this run
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    pub fn stage_state(&self, name: &str) -> Option<&StageState> {
        self.stages.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Names of the stages that actually started, in order
    pub fn started_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|(_, s)| s.was_started())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn into_result(mut self) -> Result<PipelineRun, PipelineFailure> {
        match self.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}
