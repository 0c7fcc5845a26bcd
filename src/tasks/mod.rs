//! Named tasks and the pipelines assembled from them

pub mod banner;
pub mod bundle;
pub mod docs;
pub mod release;

use crate::core::{config::ProjectConfig, Command, Pipeline, Stage};
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use bundle::build_bundle;
pub use docs::update_version_references;
pub use release::release_pipeline;

/// A task that can be run as a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    Lint,
    Bundle,
    Test,
    Report,
    UpdateVersionReferences,
}

impl TaskName {
    pub const ALL: [TaskName; 5] = [
        TaskName::Lint,
        TaskName::Bundle,
        TaskName::Test,
        TaskName::Report,
        TaskName::UpdateVersionReferences,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Lint => "lint",
            TaskName::Bundle => "bundle",
            TaskName::Test => "test",
            TaskName::Report => "report",
            TaskName::UpdateVersionReferences => "update-version-references",
        }
    }

    /// Human-readable stage label
    pub fn label(self) -> &'static str {
        match self {
            TaskName::Lint => "Lint",
            TaskName::Bundle => "Bundle",
            TaskName::Test => "Test",
            TaskName::Report => "Generate reports",
            TaskName::UpdateVersionReferences => "Update version references",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskName::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = TaskName::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown task '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// How a pipeline calls back into this executable for built-in tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfInvocation {
    executable: PathBuf,
    config: PathBuf,
}

impl SelfInvocation {
    pub fn new(executable: PathBuf, config: PathBuf) -> Self {
        Self { executable, config }
    }

    /// Resolve the running executable
    pub fn current(config: PathBuf) -> Result<Self> {
        let executable = std::env::current_exe().context("Cannot locate the relay executable")?;
        Ok(Self::new(executable, config))
    }

    pub fn command(&self, task: TaskName) -> Command {
        Command::new(self.executable.to_string_lossy())
            .arg("--config")
            .arg(self.config.to_string_lossy())
            .arg(task.as_str())
    }
}

/// Stage that performs `task`
///
/// Tasks without external commands call back into this executable.
pub fn task_stage(task: TaskName, config: &ProjectConfig, relay: &SelfInvocation) -> Result<Stage> {
    let stage = Stage::new(task.as_str()).with_label(task.label());
    let stage = match config.tasks.spec(task) {
        Some(spec) => stage.commands(
            spec.to_commands()
                .with_context(|| format!("Invalid tasks.{}", task))?,
        ),
        None => stage.command(relay.command(task)),
    };
    Ok(stage)
}

/// One-stage pipeline running a single task
pub fn task_pipeline(task: TaskName, config: &ProjectConfig, relay: &SelfInvocation) -> Result<Pipeline> {
    Ok(Pipeline::new(task.as_str()).stage(task_stage(task, config, relay)?))
}

/// Pipeline re-run by the watch loop on every matching change
pub fn watch_pipeline(config: &ProjectConfig, relay: &SelfInvocation) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new("watch");
    for task in config.watch_tasks() {
        pipeline = pipeline.stage(task_stage(task, config, relay)?);
    }
    Ok(pipeline)
}
