//! Events emitted while a pipeline runs

use crate::core::ExecutionStatus;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_stages: usize,
    },
    StageStarted {
        stage: String,
        label: String,
        /// One-based position in the pipeline
        position: usize,
        total: usize,
    },
    CommandStarted {
        stage: String,
        index: usize,
        command: String,
    },
    /// A command marked `allow_failure` exited non-zero and was ignored
    CommandTolerated {
        stage: String,
        index: usize,
        command: String,
        code: Option<i32>,
    },
    StageCompleted {
        stage: String,
    },
    StageFailed {
        stage: String,
        command_index: usize,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        pipeline_name: String,
        status: ExecutionStatus,
        elapsed: Duration,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Fan-out of events to the registered handlers
#[derive(Clone, Default)]
pub struct EventSink {
    handlers: Vec<EventHandler>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    pub fn emit(&self, event: ExecutionEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
