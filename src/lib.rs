//! relay - build, watch and release pipelines for a JavaScript library

pub mod cli;
pub mod core;
pub mod execution;
pub mod tasks;
pub mod watch;

// Re-export commonly used types
pub use core::{Command, ExecutionStatus, PackageManifest, Pipeline, Stage, StageState};
pub use core::config::ProjectConfig;
pub use execution::{CommandRunner, ExecutionEngine, ExecutionEvent, PipelineRun, ProcessRunner};
pub use tasks::{SelfInvocation, TaskName};
pub use watch::{TriggerHandler, WatchTrigger};
