//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline is currently running
    Running,
    /// Every stage completed
    Completed,
    /// A stage failed and the rest of the pipeline was abandoned
    Failed,
}

impl ExecutionStatus {
    /// Process exit status for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            ExecutionStatus::Completed => 0,
            _ => 1,
        }
    }
}

/// State of a single stage within one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageState {
    /// Stage has not been reached
    Pending,
    /// Stage is executing
    Running { started_at: DateTime<Utc> },
    /// Every command in the stage succeeded
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// The command at `command_index` failed; later commands never ran
    Failed {
        command_index: usize,
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// An earlier stage failed, so this one never ran
    Skipped,
}

impl StageState {
    /// Check if stage is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageState::Completed { .. } | StageState::Failed { .. } | StageState::Skipped
        )
    }

    /// Whether the stage actually started executing commands
    pub fn was_started(&self) -> bool {
        matches!(
            self,
            StageState::Running { .. } | StageState::Completed { .. } | StageState::Failed { .. }
        )
    }
}
