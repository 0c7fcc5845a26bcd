//! Pipeline domain model

use crate::core::Stage;

/// A fixed, totally ordered sequence of stages
///
/// There is no dependency graph: stage `n + 1` runs only after stage `n`
/// succeeded, and relies on whatever state stage `n` left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Stages in execution order
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Find a stage by name
    pub fn find_stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Total number of commands across all stages
    pub fn command_count(&self) -> usize {
        self.stages.iter().map(Stage::len).sum()
    }
}
